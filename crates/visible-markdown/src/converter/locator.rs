//! Top-level content discovery.
//!
//! Walks the document once and returns the outermost elements that both look
//! like content and are visible, in document order. Each located element is
//! later rendered as a self-contained unit.

use tracing::debug;

use super::main::DomContext;
use super::style::has_block_child;
use super::visibility::is_ignored_element;
use crate::dom::NodeId;
use crate::options::Scope;

/// Container tags that hold content whether or not they have text of their own.
fn is_structural_tag(tag: &str) -> bool {
    matches!(
        tag,
        "article"
            | "section"
            | "main"
            | "div"
            | "p"
            | "ul"
            | "ol"
            | "li"
            | "dl"
            | "dd"
            | "dt"
            | "blockquote"
            | "table"
            | "td"
            | "th"
            | "figure"
            | "figcaption"
            | "pre"
            | "details"
            | "summary"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
    )
}

/// Whether an element is a content container, carries its own text or
/// directly holds a displayable image. Links wrapping block content count as
/// containers.
pub(crate) fn is_potential_content(dom: &DomContext<'_>, id: NodeId) -> bool {
    let Some(element) = dom.doc.element(id) else {
        return false;
    };
    is_structural_tag(&element.tag)
        || (element.tag == "a" && has_block_child(dom.doc, id))
        || dom.classifier.has_direct_text(dom.doc, id)
        || dom
            .doc
            .element_children(id)
            .any(|child| dom.doc.tag(child) == Some("img") && dom.is_valid_image(child))
}

/// Whether nothing inside the element can ever render.
fn prunes_subtree(dom: &DomContext<'_>, id: NodeId) -> bool {
    let Some(element) = dom.doc.element(id) else {
        return true;
    };
    let style = &element.style;
    is_ignored_element(element)
        || dom.classifier.has_ignored_class(element)
        || style.is_display_none()
        || style.is_transparent()
        || style.is_fully_clipped()
}

/// Find the outermost visible content elements below `root`.
///
/// Candidates contained in an already selected candidate are dropped, and the
/// result is sorted by document order.
pub(crate) fn find_top_level_elements(dom: &DomContext<'_>, root: NodeId, scope: Scope) -> Vec<NodeId> {
    let doc = dom.doc;
    let mut candidates = Vec::new();
    let mut stack: Vec<NodeId> = doc.element_children(root).collect();
    stack.reverse();

    while let Some(id) = stack.pop() {
        if prunes_subtree(dom, id) {
            continue;
        }
        let visible = dom.is_hard_visible(id) && (scope == Scope::All || dom.is_in_viewport(id));
        if visible && is_potential_content(dom, id) {
            candidates.push(id);
        }
        let children: Vec<NodeId> = doc.element_children(id).collect();
        stack.extend(children.into_iter().rev());
    }

    let mut selected: Vec<NodeId> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !selected.iter().any(|outer| doc.contains(*outer, candidate)) {
            selected.push(candidate);
        }
    }
    selected.sort_by(|a, b| doc.compare_document_order(*a, *b));

    debug!(count = selected.len(), scope = %scope, "located top-level elements");
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ComputedStyle, Document, Element, Rect, Viewport};
    use crate::options::ExtractOptions;

    fn block(tag: &str, rect: Rect) -> Element {
        Element::new(tag)
            .with_style(ComputedStyle {
                display: "block".to_string(),
                ..ComputedStyle::default()
            })
            .with_rect(rect)
    }

    fn locate(doc: &Document, scope: Scope) -> Vec<NodeId> {
        let options = ExtractOptions::with_scope(scope);
        let dom = DomContext::new(doc, &options).unwrap();
        find_top_level_elements(&dom, doc.body(), scope)
    }

    fn page() -> (Document, NodeId) {
        let mut doc = Document::new(Viewport {
            width: 800.0,
            height: 600.0,
        });
        let root = doc.root();
        let body = doc.append_element(root, block("body", Rect::new(0.0, 0.0, 800.0, 3000.0)));
        (doc, body)
    }

    #[test]
    fn test_outermost_candidates_only() {
        let (mut doc, body) = page();
        let article = doc.append_element(body, block("article", Rect::new(0.0, 0.0, 800.0, 500.0)));
        let p = doc.append_element(article, block("p", Rect::new(0.0, 0.0, 800.0, 40.0)));
        doc.append_text(p, "Paragraph text");
        assert_eq!(locate(&doc, Scope::Viewport), vec![article]);
    }

    #[test]
    fn test_viewport_scope_skips_offscreen() {
        let (mut doc, body) = page();
        let top = doc.append_element(body, block("p", Rect::new(0.0, 0.0, 800.0, 40.0)));
        doc.append_text(top, "Above the fold");
        let bottom = doc.append_element(body, block("p", Rect::new(0.0, 2000.0, 800.0, 40.0)));
        doc.append_text(bottom, "Below the fold");
        assert_eq!(locate(&doc, Scope::Viewport), vec![top]);
        assert_eq!(locate(&doc, Scope::All), vec![top, bottom]);
    }

    #[test]
    fn test_hidden_and_ignored_subtrees_are_pruned() {
        let (mut doc, body) = page();
        let mut hidden_style = ComputedStyle::default();
        hidden_style.apply("display", "none", 16.0, 16.0);
        let hidden = doc.append_element(body, Element::new("div").with_style(hidden_style));
        let inner = doc.append_element(hidden, block("p", Rect::new(0.0, 0.0, 800.0, 40.0)));
        doc.append_text(inner, "Secret");
        let nav = doc.append_element(body, block("nav", Rect::new(0.0, 50.0, 800.0, 40.0)));
        let link = doc.append_element(nav, block("p", Rect::new(0.0, 50.0, 800.0, 40.0)));
        doc.append_text(link, "Menu");
        assert!(locate(&doc, Scope::All).is_empty());
    }

    #[test]
    fn test_visibility_hidden_descends() {
        let (mut doc, body) = page();
        let mut hidden_style = ComputedStyle::default();
        hidden_style.apply("visibility", "hidden", 16.0, 16.0);
        let wrapper = doc.append_element(
            body,
            Element::new("div")
                .with_style(hidden_style)
                .with_rect(Rect::new(0.0, 0.0, 800.0, 100.0)),
        );
        let mut shown = ComputedStyle::default();
        shown.apply("visibility", "visible", 16.0, 16.0);
        let p = doc.append_element(
            wrapper,
            Element::new("p").with_style(shown).with_rect(Rect::new(0.0, 0.0, 800.0, 40.0)),
        );
        doc.append_text(p, "Shown again");
        assert_eq!(locate(&doc, Scope::All), vec![p]);
    }

    #[test]
    fn test_inline_text_holder_is_a_candidate() {
        let (mut doc, body) = page();
        let span = doc.append_element(body, Element::new("span").with_rect(Rect::new(0.0, 0.0, 120.0, 20.0)));
        doc.append_text(span, "Loose text");
        let empty_span = doc.append_element(body, Element::new("span").with_rect(Rect::new(0.0, 30.0, 120.0, 20.0)));
        doc.append_text(empty_span, " ");
        assert_eq!(locate(&doc, Scope::All), vec![span]);
    }
}
