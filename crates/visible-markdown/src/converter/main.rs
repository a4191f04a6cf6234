//! Main extraction pipeline.
//!
//! This module implements the extraction entry point and the recursive node
//! processor that turns located top-level elements into Markdown. Element
//! rendering is dispatched on [`ElementKind`]; handlers for the individual
//! kinds live in the `block` and `inline` modules.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use super::context::{Context, ProcessResult};
use super::locator::find_top_level_elements;
use super::markdown;
use super::resolver;
use super::style::{has_block_child, infer_heading_level, is_block_display, is_css_bold, is_css_italic, is_inline_tag};
use super::text::{clean_text, collapse_newlines};
use super::viewport::{self, Thresholds};
use super::visibility::Classifier;
use crate::dom::{Document, NodeData, NodeId};
use crate::error::{ExtractError, Result};
use crate::options::{ExtractOptions, Scope};

/// Prefix of the comment returned when extraction fails.
pub(crate) const ERROR_COMMENT_PREFIX: &str = "<!-- Error extracting content: ";

/// Read-only state shared by every step of one extraction.
pub(crate) struct DomContext<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) options: &'a ExtractOptions,
    pub(crate) classifier: Classifier,
    pub(crate) thresholds: Thresholds,
}

impl<'a> DomContext<'a> {
    pub(crate) fn new(doc: &'a Document, options: &'a ExtractOptions) -> Result<Self> {
        Ok(Self {
            doc,
            options,
            classifier: Classifier::new(options)?,
            thresholds: Thresholds::from(options),
        })
    }

    pub(crate) fn is_hard_visible(&self, id: NodeId) -> bool {
        self.classifier.is_hard_visible(self.doc, id)
    }

    pub(crate) fn is_in_viewport(&self, id: NodeId) -> bool {
        viewport::is_in_viewport(self.doc, id, self.thresholds)
    }

    pub(crate) fn image_source(&self, id: NodeId) -> Option<String> {
        resolver::image_source(self.doc, self.options, id)
    }

    /// A hard-visible `<img>` with a usable source.
    pub(crate) fn is_valid_image(&self, id: NodeId) -> bool {
        self.doc.tag(id) == Some("img") && self.is_hard_visible(id) && self.image_source(id).is_some()
    }
}

/// Inline emphasis flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Emphasis {
    Bold,
    Italic,
    Strikethrough,
}

/// How an element is rendered, decided by its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElementKind {
    Heading(u8),
    Paragraph,
    Link,
    Image,
    List { ordered: bool },
    ListItem,
    Blockquote,
    Preformatted,
    InlineCode,
    LineBreak,
    HorizontalRule,
    Emphasis(Emphasis),
    Table,
    FigureCaption,
    Summary,
    /// Structural wrapper rendered as a block of its children.
    Block,
    /// Inline wrapper rendered as its children.
    Inline,
    /// Anything else; structure is inferred from computed style.
    Styled,
}

impl ElementKind {
    pub(crate) fn of(tag: &str) -> Self {
        match tag {
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "p" => Self::Paragraph,
            "a" => Self::Link,
            "img" => Self::Image,
            "ul" | "menu" => Self::List { ordered: false },
            "ol" => Self::List { ordered: true },
            "li" => Self::ListItem,
            "blockquote" => Self::Blockquote,
            "pre" => Self::Preformatted,
            "code" => Self::InlineCode,
            "br" => Self::LineBreak,
            "hr" => Self::HorizontalRule,
            "strong" | "b" => Self::Emphasis(Emphasis::Bold),
            "em" | "i" => Self::Emphasis(Emphasis::Italic),
            "s" | "strike" | "del" => Self::Emphasis(Emphasis::Strikethrough),
            "table" => Self::Table,
            "figcaption" => Self::FigureCaption,
            "summary" => Self::Summary,
            "html" | "body" | "figure" | "details" | "dl" | "dt" | "dd" | "caption" | "thead" | "tbody" | "tfoot"
            | "tr" | "td" | "th" => Self::Block,
            tag if is_inline_tag(tag) && tag != "span" => Self::Inline,
            _ => Self::Styled,
        }
    }
}

/// Recursive node processor for one extraction.
///
/// Owns the visited set, so every node contributes to the output at most once
/// and no state survives between invocations.
pub(crate) struct Synthesizer<'a> {
    pub(crate) dom: &'a DomContext<'a>,
    pub(crate) visited: HashSet<NodeId>,
}

impl<'a> Synthesizer<'a> {
    pub(crate) fn new(dom: &'a DomContext<'a>) -> Self {
        Self {
            dom,
            visited: HashSet::new(),
        }
    }

    /// Mark `id` and everything below it as consumed.
    pub(crate) fn mark_subtree_visited(&mut self, id: NodeId) {
        self.visited.insert(id);
        self.visited.extend(self.dom.doc.descendants(id));
    }

    /// Atomic elements are rendered whole or not at all; the top-level element
    /// itself is exempt because the locator already tested it.
    pub(crate) fn within_viewport(&self, id: NodeId, ctx: &Context) -> bool {
        ctx.scope == Scope::All || ctx.is_top_level_element || self.dom.is_in_viewport(id)
    }

    /// Render one node.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::DepthLimit`] when the node lies deeper than the
    /// configured maximum nesting.
    pub(crate) fn process_node(&mut self, id: NodeId, ctx: &Context) -> Result<Option<ProcessResult>> {
        let dom = self.dom;
        if ctx.depth > dom.options.max_depth {
            return Err(ExtractError::DepthLimit(dom.options.max_depth));
        }
        if self.visited.contains(&id) {
            return Ok(None);
        }

        match dom.doc.data(id) {
            NodeData::Document | NodeData::Comment(_) => Ok(None),
            NodeData::Text(text) => Ok(self.process_text(id, text, ctx)),
            NodeData::Element(element) => {
                self.visited.insert(id);
                if !dom.is_hard_visible(id) {
                    return Ok(None);
                }
                let kind = ElementKind::of(&element.tag);
                trace!(tag = %element.tag, ?kind, depth = ctx.depth, "processing element");
                Ok(self.process_element(id, kind, ctx))
            }
        }
    }

    fn process_text(&mut self, id: NodeId, text: &str, ctx: &Context) -> Option<ProcessResult> {
        if text.trim().is_empty() {
            return None;
        }
        self.visited.insert(id);
        if ctx.scope == Scope::Viewport {
            if let Some(parent) = self.dom.doc.parent_element(id) {
                if !self.dom.is_in_viewport(parent) {
                    return None;
                }
            }
        }
        ProcessResult::inline(clean_text(text), id)
    }

    fn process_element(&mut self, id: NodeId, kind: ElementKind, ctx: &Context) -> Option<ProcessResult> {
        match kind {
            ElementKind::Heading(level) => self.process_heading(id, level, ctx),
            ElementKind::Paragraph => {
                let content = self.combine_children(id, ctx)?;
                ProcessResult::block(markdown::paragraph(&content.markdown), id)
            }
            ElementKind::Link => self.process_link(id, ctx),
            ElementKind::Image => self.process_image(id, ctx),
            ElementKind::List { ordered } => self.process_list(id, ordered, ctx),
            ElementKind::ListItem => self.process_list_item(id, ctx),
            ElementKind::Blockquote => {
                let content = self.combine_children(id, ctx)?;
                ProcessResult::block(markdown::blockquote(&content.markdown), id)
            }
            ElementKind::Preformatted => self.process_preformatted(id, ctx),
            ElementKind::InlineCode => self.process_inline_code(id, ctx),
            // Line breaks are joiners, handled while combining siblings.
            ElementKind::LineBreak => None,
            ElementKind::HorizontalRule => {
                if self.within_viewport(id, ctx) {
                    ProcessResult::block(markdown::horizontal_rule(), id)
                } else {
                    None
                }
            }
            ElementKind::Emphasis(emphasis) => self.process_emphasis(id, emphasis, ctx),
            ElementKind::Table => self.process_table(id, ctx),
            ElementKind::FigureCaption => {
                let content = self.combine_children(id, ctx)?;
                ProcessResult::block(markdown::paragraph(&markdown::italic(&content.markdown)), id)
            }
            ElementKind::Summary => {
                let content = self.combine_children(id, ctx)?;
                ProcessResult::block(markdown::paragraph(&markdown::bold(&content.markdown)), id)
            }
            ElementKind::Block | ElementKind::Inline => self.combine_children(id, ctx),
            ElementKind::Styled => self.process_styled(id, ctx),
        }
    }

    /// Elements without a dedicated handler: font size and weight may make
    /// them headings, bold or italic text; otherwise their children render in
    /// place.
    fn process_styled(&mut self, id: NodeId, ctx: &Context) -> Option<ProcessResult> {
        let dom = self.dom;
        let element = dom.doc.element(id)?;
        let style = &element.style;
        if !has_block_child(dom.doc, id) {
            if let Some(level) = infer_heading_level(style, dom.doc.base_font_size()) {
                trace!(tag = %element.tag, level, "inferred heading from font metrics");
                return self.process_heading(id, level, ctx);
            }
        }
        if is_css_bold(style) {
            return self.process_emphasis(id, Emphasis::Bold, ctx);
        }
        if is_css_italic(style) {
            return self.process_emphasis(id, Emphasis::Italic, ctx);
        }
        self.combine_children(id, ctx)
    }

    /// Whether the element renders inline, deciding how its combined result joins.
    pub(crate) fn is_inline_element(&self, id: NodeId) -> bool {
        let Some(element) = self.dom.doc.element(id) else {
            return true;
        };
        match ElementKind::of(&element.tag) {
            ElementKind::Styled => !is_block_display(&element.style),
            _ => is_inline_tag(&element.tag),
        }
    }

    /// Render the children of `id` and join them.
    ///
    /// A child that fails is logged and skipped. The combined result is a
    /// block when any child is one or when `id` itself is not inline.
    pub(crate) fn combine_children(&mut self, id: NodeId, ctx: &Context) -> Option<ProcessResult> {
        let doc = self.dom.doc;
        let child_ctx = ctx.child();
        let mut combined: Option<ProcessResult> = None;
        let mut pending_break = false;

        for &child in doc.children(id) {
            if ctx.skip_node == Some(child) {
                continue;
            }
            if doc.tag(child) == Some("br") {
                self.visited.insert(child);
                pending_break = combined.is_some();
                continue;
            }
            match self.process_node(child, &child_ctx) {
                Ok(Some(result)) => {
                    if let Some(acc) = combined.as_mut() {
                        acc.append(result, pending_break);
                    } else {
                        combined = Some(result);
                    }
                    pending_break = false;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(node = child.index(), error = %err, "skipping node that failed to process");
                }
            }
        }

        let is_block = !self.is_inline_element(id);
        combined.map(|result| result.finish(id, is_block))
    }
}

/// Extract the visible content of `doc` as Markdown.
///
/// Never fails: errors and panics inside the pipeline are reported as a single
/// `<!-- Error extracting content: ... -->` comment.
pub fn extract(doc: &Document, options: &ExtractOptions) -> String {
    match panic::catch_unwind(AssertUnwindSafe(|| extract_markdown(doc, options))) {
        Ok(Ok(markdown)) => markdown,
        Ok(Err(err)) => {
            warn!(error = %err, "extraction failed");
            error_comment(&err.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(error = %message, "extraction panicked");
            error_comment(&message)
        }
    }
}

fn extract_markdown(doc: &Document, options: &ExtractOptions) -> Result<String> {
    options.validate()?;
    let dom = DomContext::new(doc, options)?;
    let roots = find_top_level_elements(&dom, doc.body(), options.scope);

    let mut synthesizer = Synthesizer::new(&dom);
    let ctx = Context::top_level(options.scope);
    let mut combined: Option<ProcessResult> = None;
    for root in roots {
        match synthesizer.process_node(root, &ctx) {
            Ok(Some(result)) => {
                if let Some(acc) = combined.as_mut() {
                    acc.append(result, false);
                } else {
                    combined = Some(result);
                }
            }
            Ok(None) => {}
            Err(err) => warn!(node = root.index(), error = %err, "skipping top-level element"),
        }
    }

    let markdown = combined.map_or_else(String::new, |result| collapse_newlines(&result.markdown).trim().to_string());
    debug!(bytes = markdown.len(), "extraction finished");
    Ok(markdown)
}

fn error_comment(message: &str) -> String {
    format!("{ERROR_COMMENT_PREFIX}{} -->", message.replace("-->", "--&gt;"))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ComputedStyle, Element, Rect, Viewport};
    use pretty_assertions::assert_eq;

    fn page() -> (Document, NodeId) {
        let mut doc = Document::new(Viewport {
            width: 800.0,
            height: 600.0,
        });
        let root = doc.root();
        let body = doc.append_element(root, block("body", Rect::new(0.0, 0.0, 800.0, 600.0)));
        (doc, body)
    }

    fn block(tag: &str, rect: Rect) -> Element {
        Element::new(tag)
            .with_style(ComputedStyle {
                display: "block".to_string(),
                ..ComputedStyle::default()
            })
            .with_rect(rect)
    }

    fn full(tag: &str) -> Element {
        block(tag, Rect::new(0.0, 0.0, 800.0, 40.0))
    }

    fn with_text(doc: &mut Document, parent: NodeId, element: Element, text: &str) -> NodeId {
        let id = doc.append_element(parent, element);
        doc.append_text(id, text);
        id
    }

    fn all() -> ExtractOptions {
        ExtractOptions::with_scope(Scope::All)
    }

    #[test]
    fn test_element_kinds() {
        assert_eq!(ElementKind::of("h3"), ElementKind::Heading(3));
        assert_eq!(ElementKind::of("ol"), ElementKind::List { ordered: true });
        assert_eq!(ElementKind::of("del"), ElementKind::Emphasis(Emphasis::Strikethrough));
        assert_eq!(ElementKind::of("abbr"), ElementKind::Inline);
        assert_eq!(ElementKind::of("div"), ElementKind::Styled);
        assert_eq!(ElementKind::of("span"), ElementKind::Styled);
        assert_eq!(ElementKind::of("x-card"), ElementKind::Styled);
    }

    #[test]
    fn test_paragraphs_are_separated_by_blank_line() {
        let (mut doc, body) = page();
        with_text(&mut doc, body, full("p"), "First paragraph.");
        with_text(&mut doc, body, full("p"), "Second paragraph.");
        assert_eq!(extract(&doc, &all()), "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn test_inline_children_join_with_spaces() {
        let (mut doc, body) = page();
        let p = doc.append_element(body, full("p"));
        doc.append_text(p, "Some ");
        with_text(&mut doc, p, Element::new("strong").with_rect(Rect::new(0.0, 0.0, 50.0, 20.0)), "bold");
        doc.append_text(p, " text");
        assert_eq!(extract(&doc, &all()), "Some **bold** text");
    }

    #[test]
    fn test_line_break_joins_with_newline() {
        let (mut doc, body) = page();
        let p = doc.append_element(body, full("p"));
        doc.append_text(p, "Line one");
        doc.append_element(p, Element::new("br"));
        doc.append_text(p, "Line two");
        assert_eq!(extract(&doc, &all()), "Line one  \nLine two");
    }

    #[test]
    fn test_hidden_child_is_skipped() {
        let (mut doc, body) = page();
        let div = doc.append_element(body, full("div"));
        with_text(&mut doc, div, full("p"), "Visible");
        let mut hidden = ComputedStyle::default();
        hidden.apply("display", "none", 16.0, 16.0);
        with_text(&mut doc, div, Element::new("p").with_style(hidden), "Hidden");
        assert_eq!(extract(&doc, &all()), "Visible");
    }

    #[test]
    fn test_styled_heading_inference() {
        let (mut doc, body) = page();
        let mut style = ComputedStyle {
            display: "block".to_string(),
            ..ComputedStyle::default()
        };
        style.apply("font-size", "32px", 16.0, 16.0);
        style.apply("font-weight", "700", 16.0, 16.0);
        with_text(
            &mut doc,
            body,
            Element::new("div")
                .with_style(style)
                .with_rect(Rect::new(0.0, 0.0, 800.0, 40.0)),
            "Big title",
        );
        assert_eq!(extract(&doc, &all()), "# Big title");
    }

    #[test]
    fn test_styled_bold_and_italic() {
        let (mut doc, body) = page();
        let p = doc.append_element(body, full("p"));
        let mut bold = ComputedStyle::default();
        bold.apply("font-weight", "600", 16.0, 16.0);
        with_text(&mut doc, p, Element::new("span").with_style(bold).with_rect(Rect::new(0.0, 0.0, 40.0, 20.0)), "Heavy");
        let mut italic = ComputedStyle::default();
        italic.apply("font-style", "italic", 16.0, 16.0);
        with_text(&mut doc, p, Element::new("span").with_style(italic).with_rect(Rect::new(0.0, 0.0, 40.0, 20.0)), "slanted");
        assert_eq!(extract(&doc, &all()), "**Heavy** *slanted*");
    }

    #[test]
    fn test_depth_limit_skips_deep_subtree() {
        let (mut doc, body) = page();
        let outer = doc.append_element(body, full("div"));
        with_text(&mut doc, outer, full("p"), "Shallow");
        let mut parent = outer;
        for _ in 0..6 {
            parent = doc.append_element(parent, full("div"));
        }
        doc.append_text(parent, "Deep");
        let options = ExtractOptions {
            max_depth: 3,
            ..all()
        };
        assert_eq!(extract(&doc, &options), "Shallow");
    }

    #[test]
    fn test_invalid_options_yield_error_comment() {
        let (mut doc, body) = page();
        with_text(&mut doc, body, full("p"), "Text");
        let options = ExtractOptions {
            min_visible_ratio: 2.0,
            ..all()
        };
        let output = extract(&doc, &options);
        assert!(output.starts_with(ERROR_COMMENT_PREFIX), "{output}");
        assert!(output.ends_with(" -->"));
    }

    #[test]
    fn test_empty_document_yields_empty_string() {
        assert_eq!(extract(&Document::default(), &ExtractOptions::default()), "");
    }

    #[test]
    fn test_visited_nodes_render_once() {
        let (mut doc, body) = page();
        let p = with_text(&mut doc, body, full("p"), "Once");
        let dom_options = all();
        let dom = DomContext::new(&doc, &dom_options).unwrap();
        let mut synthesizer = Synthesizer::new(&dom);
        let ctx = Context::top_level(Scope::All);
        assert!(synthesizer.process_node(p, &ctx).unwrap().is_some());
        assert!(synthesizer.process_node(p, &ctx).unwrap().is_none());
    }

    #[test]
    fn test_error_comment_escapes_terminator() {
        assert_eq!(error_comment("bad --> input"), "<!-- Error extracting content: bad --&gt; input -->");
    }
}
