//! Read-only document model consumed by the extractor.
//!
//! A [`Document`] is an arena of nodes carrying everything the extractor
//! would otherwise ask a live browser for: tag names and attributes, the
//! computed style subset in [`ComputedStyle`], element geometry in
//! [`Layout`], the current [`Viewport`] and the base URL used to resolve
//! relative references. Documents are built by the HTML loader
//! ([`Document::parse_html`]), decoded from a captured page snapshot
//! ([`Document::from_snapshot_json`]) or assembled node by node.

mod geometry;
mod html;
mod snapshot;
mod style;

use std::cmp::Ordering;

use url::Url;

pub use geometry::{Layout, Rect, Viewport};
pub use html::HtmlLoadOptions;
pub use snapshot::{PageSnapshot, SnapshotNode};
pub use style::{ComputedStyle, DEFAULT_FONT_SIZE, parse_declarations, parse_length, parse_px};

/// Identity of a node inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The document root.
    Document,
    /// An element.
    Element(Element),
    /// A text node.
    Text(String),
    /// A comment.
    Comment(String),
}

/// An element with its attributes, computed style and geometry.
#[derive(Debug, Clone)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in source order, names lowercased.
    pub attributes: Vec<(String, String)>,
    /// Computed style.
    pub style: ComputedStyle,
    /// Rendered geometry.
    pub layout: Layout,
    /// `currentSrc` of image elements, as reported by the browser.
    pub current_src: Option<String>,
}

impl Element {
    /// A new element with default style and an empty layout.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            style: ComputedStyle::default(),
            layout: Layout::default(),
            current_src: None,
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Replace the computed style.
    #[must_use]
    pub fn with_style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the layout from a bounding rectangle.
    #[must_use]
    pub const fn with_rect(mut self, rect: Rect) -> Self {
        self.layout = Layout::from_rect(rect);
        self
    }

    /// Set `currentSrc`.
    #[must_use]
    pub fn with_current_src(mut self, src: &str) -> Self {
        self.current_src = Some(src.to_string());
        self
    }

    /// Attribute value by (lowercase) name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value with surrounding whitespace removed, `None` when blank.
    #[must_use]
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|value| !value.is_empty())
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Raw `class` attribute.
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    /// Individual class tokens.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_name().split_whitespace()
    }
}

#[derive(Debug, Clone)]
struct NodeEntry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// An owned, immutable-during-extraction document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeEntry>,
    viewport: Viewport,
    base_url: Option<Url>,
    base_font_size: f64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl Document {
    /// An empty document with the given viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            nodes: vec![NodeEntry {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            viewport,
            base_url: None,
            base_font_size: DEFAULT_FONT_SIZE,
        }
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.push(parent, NodeData::Element(element))
    }

    /// Append a text node as the last child of `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Text(text.to_string()))
    }

    /// Append a comment as the last child of `parent`.
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Comment(text.to_string()))
    }

    /// The document root.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The `<body>` element, or the root when the document has none.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.descendants(self.root())
            .find(|id| self.element(*id).is_some_and(|el| el.tag == "body"))
            .unwrap_or_else(|| self.root())
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document holds only its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Node payload.
    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Element payload, `None` for non-element nodes.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Text of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Parent, when it is an element.
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.element(*parent).is_some())
    }

    /// Child nodes in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Whether `node` is `ancestor` or lies inside it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut out = String::new();
        for descendant in self.descendants(id) {
            if let Some(text) = self.text(descendant) {
                out.push_str(text);
            }
        }
        out
    }

    /// Relative position of two nodes in document order.
    #[must_use]
    pub fn compare_document_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let path_a = self.path_from_root(a);
        let path_b = self.path_from_root(b);
        for (step_a, step_b) in path_a.iter().zip(path_b.iter()) {
            if step_a != step_b {
                return step_a.cmp(step_b);
            }
        }
        // One node is an ancestor of the other; ancestors come first.
        path_a.len().cmp(&path_b.len())
    }

    /// Sibling indices from the root down to `id`.
    fn path_from_root(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let index = self
                .children(parent)
                .iter()
                .position(|child| *child == current)
                .unwrap_or(0);
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Current viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace the viewport, e.g. after the host page scrolled or resized.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Base URL for resolving relative references.
    #[must_use]
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Set the base URL.
    pub fn set_base_url(&mut self, url: Option<Url>) {
        self.base_url = url;
    }

    /// Font size of the document's root element in px.
    #[must_use]
    pub const fn base_font_size(&self) -> f64 {
        self.base_font_size
    }

    /// Set the root font size.
    pub fn set_base_font_size(&mut self, size: f64) {
        self.base_font_size = size;
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}
