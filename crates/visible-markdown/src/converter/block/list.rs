//! Ordered and unordered lists.

use tracing::warn;

use crate::converter::context::{Context, ProcessResult};
use crate::converter::main::Synthesizer;
use crate::converter::markdown;
use crate::converter::visibility::is_ignored_element;
use crate::dom::{NodeData, NodeId};

impl Synthesizer<'_> {
    /// Render the `<li>` children of a list, numbering ordered items from the
    /// `start` attribute. Any other child is skipped with a warning.
    pub(crate) fn process_list(&mut self, id: NodeId, ordered: bool, ctx: &Context) -> Option<ProcessResult> {
        let doc = self.dom.doc;
        let mut index = if ordered {
            doc.element(id)
                .and_then(|element| element.non_empty_attr("start"))
                .and_then(|start| start.parse::<usize>().ok())
                .unwrap_or(1)
        } else {
            1
        };

        let mut items = String::new();
        for &child in doc.children(id) {
            match doc.data(child) {
                NodeData::Element(element) if element.tag == "li" => {
                    match self.process_node(child, &ctx.list_item(ordered, index)) {
                        Ok(Some(item)) => {
                            items.push_str(&item.markdown);
                            index += 1;
                        }
                        Ok(None) => {}
                        Err(err) => warn!(node = child.index(), error = %err, "skipping list item"),
                    }
                }
                NodeData::Element(element) => {
                    self.visited.insert(child);
                    if !is_ignored_element(element) {
                        warn!(tag = %element.tag, "skipping non-<li> child of list");
                    }
                }
                NodeData::Text(text) if !text.trim().is_empty() => {
                    self.visited.insert(child);
                    warn!("skipping text directly inside list");
                }
                _ => {}
            }
        }

        if items.is_empty() {
            return None;
        }
        items.push('\n');
        ProcessResult::block(items, id)
    }

    /// Render one list item at the current nesting level. Nested lists inside
    /// the item are rendered one level deeper.
    pub(crate) fn process_list_item(&mut self, id: NodeId, ctx: &Context) -> Option<ProcessResult> {
        let content = self.combine_children(id, &ctx.list_item_contents())?;
        ProcessResult::block(
            markdown::list_item(&content.markdown, ctx.level, ctx.is_ordered_list, ctx.list_item_index),
            id,
        )
    }
}
