//! HTML loader.
//!
//! Parses markup with html5ever and copies the resulting tree into a
//! [`Document`]. Raw HTML carries no layout, so styles and geometry are
//! approximated statically: user-agent defaults per tag, inline `style`
//! declarations, inheritance of inherited properties, and a rectangle that
//! every element takes from its parent unless inline `left`/`top`/`width`/
//! `height` (or the `width`/`height` attributes) say otherwise.

use std::rc::Rc;

use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use url::Url;

use super::style::{ComputedStyle, parse_declarations, parse_length};
use super::{Document, Element, Layout, NodeId, Rect, Viewport};
use crate::error::{ExtractError, Result};

/// Options for loading a document from HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlLoadOptions {
    /// Viewport the page is assumed to be rendered in.
    pub viewport: Viewport,
    /// Base URL; takes precedence over a `<base href>` in the markup.
    pub base_url: Option<String>,
}

impl Document {
    /// Parse an HTML string into a document.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Parse`] when the parser fails to read the input and
    /// [`ExtractError::InvalidOption`] when `options.base_url` is not an absolute URL.
    pub fn parse_html(html: &str, options: &HtmlLoadOptions) -> Result<Self> {
        let base_url = options
            .base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|err| ExtractError::InvalidOption {
                    name: "base_url",
                    reason: format!("`{raw}` is not an absolute URL: {err}"),
                })
            })
            .transpose()?;

        let dom = html5ever::parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .map_err(|err| ExtractError::Parse(err.to_string()))?;

        let mut builder = HtmlTreeBuilder {
            document: Self::new(options.viewport),
            base_href: None,
            root_font_size: None,
        };
        builder.copy_children(&dom.document);

        let HtmlTreeBuilder {
            mut document,
            base_href,
            root_font_size,
        } = builder;
        if let Some(size) = root_font_size {
            document.set_base_font_size(size);
        }
        let resolved_base = base_url.or_else(|| base_href.and_then(|href| Url::parse(&href).ok()));
        document.set_base_url(resolved_base);
        Ok(document)
    }
}

/// Inherited state while copying one subtree.
#[derive(Clone)]
struct ParentState {
    id: NodeId,
    style: ComputedStyle,
    rect: Rect,
    hidden: bool,
}

struct HtmlTreeBuilder {
    document: Document,
    base_href: Option<String>,
    root_font_size: Option<f64>,
}

impl HtmlTreeBuilder {
    fn copy_children(&mut self, rc_root: &Handle) {
        let viewport = self.document.viewport();
        let root_state = ParentState {
            id: self.document.root(),
            style: ComputedStyle::default(),
            rect: viewport.rect(),
            hidden: false,
        };

        // Explicit stack: pages nest deeply enough to make recursion a liability here.
        let mut stack: Vec<(Handle, Rc<ParentState>)> = Vec::new();
        let root_state = Rc::new(root_state);
        for child in rc_root.children.borrow().iter().rev() {
            stack.push((Rc::clone(child), Rc::clone(&root_state)));
        }

        while let Some((handle, parent)) = stack.pop() {
            match &handle.data {
                RcNodeData::Element { name, attrs, .. } => {
                    let tag = name.local.to_string().to_ascii_lowercase();
                    let attributes: Vec<(String, String)> = attrs
                        .borrow()
                        .iter()
                        .map(|attr| (attr.name.local.to_string().to_ascii_lowercase(), attr.value.to_string()))
                        .collect();
                    let state = self.copy_element(&tag, attributes, &parent);
                    let state = Rc::new(state);
                    for child in handle.children.borrow().iter().rev() {
                        stack.push((Rc::clone(child), Rc::clone(&state)));
                    }
                }
                RcNodeData::Text { contents } => {
                    self.document.append_text(parent.id, &contents.borrow());
                }
                RcNodeData::Comment { contents } => {
                    self.document.append_comment(parent.id, contents);
                }
                RcNodeData::Document | RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {}
            }
        }
    }

    fn copy_element(&mut self, tag: &str, attributes: Vec<(String, String)>, parent: &ParentState) -> ParentState {
        let root_font_size = self.root_font_size.unwrap_or(super::DEFAULT_FONT_SIZE);
        let mut style = ComputedStyle::inherit_from(&parent.style);
        apply_user_agent_defaults(&mut style, tag, parent.style.font_size);

        let attr = |name: &str| {
            attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        if attr("hidden").is_some() || (tag == "input" && attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")))
        {
            style.display = "none".to_string();
        }

        let declarations = attr("style").map(parse_declarations).unwrap_or_default();
        for (property, value) in &declarations {
            style.apply(property, value, parent.style.font_size, root_font_size);
        }

        if tag == "html" || (tag == "body" && self.root_font_size.is_none()) {
            self.root_font_size = Some(style.font_size);
        }
        if tag == "base" && self.base_href.is_none() {
            self.base_href = attr("href").map(str::to_string);
        }

        let hidden = parent.hidden || style.is_display_none();
        let rect = if hidden {
            Rect::default()
        } else {
            let mut rect = parent.rect;
            let presentational = [("width", attr("width")), ("height", attr("height"))];
            let inline = declarations.iter().map(|(name, value)| (name.as_str(), Some(value.as_str())));
            for (property, value) in presentational.into_iter().chain(inline) {
                let axis = if matches!(property, "left" | "width") {
                    parent.rect.width
                } else {
                    parent.rect.height
                };
                if let Some(px) = value.and_then(|v| resolve_box_length(v, axis, style.font_size, root_font_size)) {
                    set_edge(&mut rect, property, px);
                }
            }
            rect
        };

        let mut element = Element::new(tag);
        element.attributes = attributes;
        element.style = style.clone();
        element.layout = Layout::from_rect(rect);
        let id = self.document.append_element(parent.id, element);

        ParentState { id, style, rect, hidden }
    }
}

/// Box lengths resolve percentages against the parent's size on the same axis.
fn resolve_box_length(value: &str, axis: f64, font_size: f64, root_font_size: f64) -> Option<f64> {
    match value.trim().strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|pct| axis * pct / 100.0),
        None => parse_length(value, font_size, root_font_size),
    }
}

fn set_edge(rect: &mut Rect, property: &str, px: f64) {
    match property {
        "left" => rect.x = px,
        "top" => rect.y = px,
        "width" => rect.width = px.max(0.0),
        "height" => rect.height = px.max(0.0),
        _ => {}
    }
}

fn apply_user_agent_defaults(style: &mut ComputedStyle, tag: &str, parent_font_size: f64) {
    style.display = default_display(tag).to_string();

    let heading_scale = match tag {
        "h1" => Some(2.0),
        "h2" => Some(1.5),
        "h3" => Some(1.17),
        "h4" => Some(1.0),
        "h5" => Some(0.83),
        "h6" => Some(0.67),
        _ => None,
    };
    if let Some(scale) = heading_scale {
        style.font_size = parent_font_size * scale;
        style.font_weight = 700;
    }

    match tag {
        "b" | "strong" | "th" => style.font_weight = 700,
        "em" | "i" | "cite" | "var" | "dfn" | "address" => style.font_style = "italic".to_string(),
        "small" => style.font_size = parent_font_size / 1.2,
        _ => {}
    }
}

fn default_display(tag: &str) -> &'static str {
    match tag {
        "head" | "script" | "style" | "template" | "noscript" | "meta" | "link" | "title" | "base" | "datalist"
        | "param" | "source" | "track" | "area" => "none",
        "html" | "body" | "address" | "article" | "aside" | "blockquote" | "center" | "details" | "dialog" | "dd"
        | "div" | "dl" | "dt" | "fieldset" | "figcaption" | "figure" | "footer" | "form" | "h1" | "h2" | "h3"
        | "h4" | "h5" | "h6" | "header" | "hgroup" | "hr" | "legend" | "main" | "menu" | "nav" | "ol" | "p"
        | "pre" | "search" | "section" | "summary" | "ul" => "block",
        "li" => "list-item",
        "table" => "table",
        "caption" => "table-caption",
        "thead" => "table-header-group",
        "tbody" => "table-row-group",
        "tfoot" => "table-footer-group",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "col" => "table-column",
        "colgroup" => "table-column-group",
        "button" | "input" | "select" | "textarea" => "inline-block",
        _ => "inline",
    }
}
