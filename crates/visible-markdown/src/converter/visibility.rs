//! Hard visibility classification.
//!
//! An element is hard-visible when it is not an ignored tag, carries none of
//! the overlay marker classes, is not hidden by CSS and either has a rendered
//! size or directly contains non-trivial text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::text::{clean_text, is_non_trivial};
use crate::dom::{Document, Element, NodeData, NodeId};
use crate::error::{ExtractError, Result};
use crate::options::ExtractOptions;

/// Class tokens used by icon font toolkits.
static ICON_FONT_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:fa[bdlrs]?|fa-.+|glyphicon(?:-.+)?|material-(?:icons|symbols)(?:-.+)?|bi|bi-.+|icon|icon-.+|ion-.+|octicon(?:-.+)?)$")
        .expect("ICON_FONT_CLASS: hardcoded regex is valid")
});

/// Tags that never contribute content, along with their subtrees.
pub(crate) fn is_ignored_tag(tag: &str) -> bool {
    matches!(
        tag,
        "script"
            | "style"
            | "noscript"
            | "template"
            | "head"
            | "meta"
            | "link"
            | "title"
            | "base"
            | "nav"
            | "footer"
            | "aside"
            | "form"
            | "input"
            | "button"
            | "select"
            | "option"
            | "optgroup"
            | "textarea"
            | "datalist"
            | "iframe"
            | "frame"
            | "frameset"
            | "object"
            | "embed"
            | "param"
            | "svg"
            | "canvas"
            | "audio"
            | "video"
            | "source"
            | "track"
            | "map"
            | "area"
            | "dialog"
    )
}

/// `<i>`/`<span>` elements rendering an icon font glyph.
pub(crate) fn is_icon_font(element: &Element) -> bool {
    matches!(element.tag.as_str(), "i" | "span") && element.classes().any(|class| ICON_FONT_CLASS.is_match(class))
}

/// Ignored tags and icon-font markers.
pub(crate) fn is_ignored_element(element: &Element) -> bool {
    is_ignored_tag(&element.tag) || is_icon_font(element)
}

/// Decides whether an element can contribute content at all.
#[derive(Debug)]
pub(crate) struct Classifier {
    ignored_classes: Regex,
    min_text_length: usize,
}

impl Classifier {
    /// Build a classifier for the configured overlay markers.
    pub(crate) fn new(options: &ExtractOptions) -> Result<Self> {
        let alternatives = options
            .ignored_class_markers
            .iter()
            .map(|marker| regex::escape(marker.trim()))
            .collect::<Vec<_>>()
            .join("|");
        let ignored_classes = Regex::new(&format!("^(?:{alternatives})")).map_err(|err| ExtractError::InvalidOption {
            name: "ignored_class_markers",
            reason: err.to_string(),
        })?;
        Ok(Self {
            ignored_classes,
            min_text_length: options.min_text_length,
        })
    }

    /// Whether any class token starts with an overlay marker.
    pub(crate) fn has_ignored_class(&self, element: &Element) -> bool {
        element.classes().any(|class| self.ignored_classes.is_match(class))
    }

    /// Whether the node is an element that passes every hard visibility check.
    ///
    /// Non-element nodes fail closed.
    pub(crate) fn is_hard_visible(&self, doc: &Document, id: NodeId) -> bool {
        let Some(element) = doc.element(id) else {
            return false;
        };
        if is_ignored_element(element) || self.has_ignored_class(element) {
            return false;
        }
        let style = &element.style;
        if style.is_display_none() || style.is_visibility_hidden() || style.is_transparent() || style.is_fully_clipped()
        {
            return false;
        }
        element.layout.has_rendered_size() || self.has_direct_text(doc, id)
    }

    /// Whether the element's own text children hold non-trivial text.
    pub(crate) fn has_direct_text(&self, doc: &Document, id: NodeId) -> bool {
        let direct: String = doc
            .children(id)
            .iter()
            .filter_map(|child| match doc.data(*child) {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ");
        is_non_trivial(&clean_text(&direct), self.min_text_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ComputedStyle, Rect};

    fn visible_style() -> ComputedStyle {
        ComputedStyle {
            display: "block".to_string(),
            ..ComputedStyle::default()
        }
    }

    fn doc_with(element: Element, text: Option<&str>) -> (Document, NodeId) {
        let mut doc = Document::default();
        let root = doc.root();
        let id = doc.append_element(root, element);
        if let Some(text) = text {
            doc.append_text(id, text);
        }
        (doc, id)
    }

    fn classifier() -> Classifier {
        Classifier::new(&ExtractOptions::default()).unwrap()
    }

    fn sized(tag: &str) -> Element {
        Element::new(tag)
            .with_style(visible_style())
            .with_rect(Rect::new(0.0, 0.0, 200.0, 40.0))
    }

    #[test]
    fn test_sized_element_is_visible() {
        let (doc, id) = doc_with(sized("div"), None);
        assert!(classifier().is_hard_visible(&doc, id));
    }

    #[test]
    fn test_zero_size_needs_direct_text() {
        let zero = Element::new("span").with_style(visible_style());
        let (doc, id) = doc_with(zero.clone(), Some("  hello "));
        assert!(classifier().is_hard_visible(&doc, id));
        let (doc, id) = doc_with(zero.clone(), Some(" x "));
        assert!(!classifier().is_hard_visible(&doc, id));
        let (doc, id) = doc_with(zero, None);
        assert!(!classifier().is_hard_visible(&doc, id));
    }

    #[test]
    fn test_css_hiding_rejects() {
        for declaration in ["display:none", "visibility:hidden", "opacity:0", "clip:rect(0 0 0 0)"] {
            let mut style = visible_style();
            let (name, value) = declaration.split_once(':').unwrap();
            style.apply(name, value, 16.0, 16.0);
            let (doc, id) = doc_with(sized("div").with_style(style), Some("plenty of text"));
            assert!(!classifier().is_hard_visible(&doc, id), "{declaration}");
        }
    }

    #[test]
    fn test_ignored_tags_and_markers() {
        let (doc, id) = doc_with(sized("script"), Some("var x = 1;"));
        assert!(!classifier().is_hard_visible(&doc, id));
        let (doc, id) = doc_with(sized("div").with_attr("class", "card vm-overlay-badge"), Some("Badge"));
        assert!(!classifier().is_hard_visible(&doc, id));
        let (doc, id) = doc_with(sized("div").with_attr("class", "my-vm-overlay"), Some("Kept"));
        assert!(classifier().is_hard_visible(&doc, id));
    }

    #[test]
    fn test_icon_fonts_are_ignored() {
        assert!(is_icon_font(&Element::new("i").with_attr("class", "fa fa-star")));
        assert!(is_icon_font(&Element::new("span").with_attr("class", "material-icons")));
        assert!(!is_icon_font(&Element::new("i").with_attr("class", "emphasis")));
        assert!(!is_icon_font(&Element::new("div").with_attr("class", "fa")));
    }

    #[test]
    fn test_text_nodes_fail_closed() {
        let mut doc = Document::default();
        let root = doc.root();
        let text = doc.append_text(root, "loose text");
        assert!(!classifier().is_hard_visible(&doc, text));
    }
}
