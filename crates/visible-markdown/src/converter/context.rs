//! Per-branch traversal state and per-node results.

use crate::dom::NodeId;
use crate::options::Scope;

/// Traversal state passed down the recursive node processor.
///
/// Contexts are derived for each recursive call and never mutated in place
/// across sibling calls, so a branch cannot leak state into its siblings.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    /// Extraction scope of this invocation.
    pub(crate) scope: Scope,
    /// List nesting level, 0 outside any list.
    pub(crate) level: usize,
    /// Whether the enclosing list is ordered.
    pub(crate) is_ordered_list: bool,
    /// Number of the list item being rendered.
    pub(crate) list_item_index: usize,
    /// Whether the node is one of the located top-level elements.
    pub(crate) is_top_level_element: bool,
    /// A node to skip once while combining children.
    pub(crate) skip_node: Option<NodeId>,
    /// Element nesting below the top-level element.
    pub(crate) depth: usize,
}

impl Context {
    /// Context for a located top-level element.
    pub(crate) const fn top_level(scope: Scope) -> Self {
        Self {
            scope,
            level: 0,
            is_ordered_list: false,
            list_item_index: 0,
            is_top_level_element: true,
            skip_node: None,
            depth: 0,
        }
    }

    /// Context for the children of the current node. A pending skip applies
    /// to the current node's children only and is not inherited.
    pub(crate) fn child(&self) -> Self {
        Self {
            is_top_level_element: false,
            skip_node: None,
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Context for the items of a list rendered at the current level.
    pub(crate) fn list_item(&self, ordered: bool, index: usize) -> Self {
        Self {
            is_ordered_list: ordered,
            list_item_index: index,
            ..self.child()
        }
    }

    /// Context for the contents of a list item; nested lists go one level deeper.
    pub(crate) fn list_item_contents(&self) -> Self {
        Self {
            level: self.level + 1,
            ..self.child()
        }
    }

    /// Same position, skipping `node` when the children are combined.
    pub(crate) fn skipping(&self, node: NodeId) -> Self {
        Self {
            skip_node: Some(node),
            ..self.clone()
        }
    }
}

/// Markdown produced for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProcessResult {
    /// Emitted Markdown, never whitespace-only.
    pub(crate) markdown: String,
    /// Block results are separated from their neighbours by a blank line.
    pub(crate) is_block: bool,
    /// Node the result was produced for.
    pub(crate) processed_node: Option<NodeId>,
    /// Whether the last piece appended was a block.
    ends_with_block: bool,
}

impl ProcessResult {
    fn new(markdown: String, is_block: bool, node: NodeId) -> Option<Self> {
        if markdown.trim().is_empty() {
            return None;
        }
        Some(Self {
            markdown,
            is_block,
            processed_node: Some(node),
            ends_with_block: is_block,
        })
    }

    /// An inline result, `None` when `markdown` is blank.
    pub(crate) fn inline(markdown: String, node: NodeId) -> Option<Self> {
        Self::new(markdown, false, node)
    }

    /// A block result, `None` when `markdown` is blank.
    pub(crate) fn block(markdown: String, node: NodeId) -> Option<Self> {
        Self::new(markdown, true, node)
    }

    /// Re-attribute a combined result to `node`, marking it a block when `is_block`.
    pub(crate) fn finish(mut self, node: NodeId, is_block: bool) -> Self {
        self.processed_node = Some(node);
        if is_block {
            self.is_block = true;
            self.ends_with_block = true;
        }
        self
    }

    /// Append `next` using the sibling join rules.
    ///
    /// A block on either side of the seam is separated by exactly one blank
    /// line. Inline neighbours are separated by a single space unless
    /// whitespace is already present at the seam; `hard_break` requests a line
    /// break instead.
    pub(crate) fn append(&mut self, next: Self, hard_break: bool) {
        let mut joined = String::with_capacity(self.markdown.len() + next.markdown.len() + 2);
        if self.ends_with_block || next.is_block {
            joined.push_str(self.markdown.trim_end_matches('\n'));
            joined.push_str("\n\n");
            joined.push_str(next.markdown.trim_start_matches('\n'));
        } else if hard_break {
            joined.push_str(self.markdown.trim_end());
            joined.push_str("  \n");
            joined.push_str(next.markdown.trim_start());
        } else {
            joined.push_str(&self.markdown);
            let seam_has_space = self.markdown.ends_with(char::is_whitespace)
                || next.markdown.starts_with(char::is_whitespace);
            if !seam_has_space {
                joined.push(' ');
            }
            joined.push_str(&next.markdown);
        }
        self.markdown = joined;
        self.is_block |= next.is_block;
        self.ends_with_block = next.ends_with_block;
    }
}
