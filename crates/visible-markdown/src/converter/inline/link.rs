//! Links, including card-style links wrapping block content.

use tracing::debug;

use crate::converter::block::heading_level;
use crate::converter::context::{Context, ProcessResult};
use crate::converter::main::Synthesizer;
use crate::converter::markdown;
use crate::converter::resolver::link_target;
use crate::converter::style::has_block_child;
use crate::converter::text::{is_non_trivial, strip_markdown};
use crate::dom::{NodeData, NodeId};

impl Synthesizer<'_> {
    /// Render a link as `[text](url)`.
    ///
    /// A link without a navigable target renders its children in place. A link
    /// wrapping block content is rendered around its first heading.
    pub(crate) fn process_link(&mut self, id: NodeId, ctx: &Context) -> Option<ProcessResult> {
        if !self.within_viewport(id, ctx) {
            return None;
        }
        let target = link_target(self.dom.doc, self.dom.options, id);
        let Some(url) = target else {
            return self.combine_children(id, ctx);
        };
        if has_block_child(self.dom.doc, id) {
            return self.process_structured_link(id, &url, ctx);
        }

        let label = if let Some(image) = self.sole_image_child(id) {
            let label = self.image_label(image);
            self.mark_subtree_visited(image);
            label
        } else {
            let text = self
                .combine_children(id, ctx)
                .map(|content| strip_markdown(&content.markdown))
                .unwrap_or_default();
            if is_non_trivial(&text, self.dom.options.min_text_length) {
                Some(text)
            } else {
                self.first_image_label(id)
            }
        };

        match label {
            Some(label) => ProcessResult::inline(markdown::link(&label, &url), id),
            None => {
                debug!(node = id.index(), "skipping link without text or image");
                None
            }
        }
    }

    /// Card-style link: the first heading inside becomes `## [heading](url)`
    /// and the rest of the content follows it. Without a heading the link
    /// renders nothing.
    fn process_structured_link(&mut self, id: NodeId, url: &str, ctx: &Context) -> Option<ProcessResult> {
        let dom = self.dom;
        let heading = dom.doc.descendants(id).find(|node| {
            dom.doc.tag(*node).and_then(heading_level).is_some() && dom.is_hard_visible(*node)
        });
        let Some(heading) = heading else {
            debug!(node = id.index(), "skipping block link without a heading");
            return None;
        };
        let level = dom.doc.tag(heading).and_then(heading_level)?;

        self.visited.insert(heading);
        let title = self
            .combine_children(heading, &ctx.child())
            .map(|content| strip_markdown(&content.markdown))
            .unwrap_or_default();
        if title.is_empty() {
            return None;
        }

        let mut result = ProcessResult::block(markdown::heading(level, &markdown::link(&title, url)), id)?;
        if let Some(rest) = self.combine_children(id, &ctx.skipping(heading)) {
            result.append(rest, false);
        }
        Some(result.finish(id, true))
    }

    /// The link's only content is a single valid image.
    fn sole_image_child(&self, id: NodeId) -> Option<NodeId> {
        let doc = self.dom.doc;
        let has_text = doc.children(id).iter().any(|child| match doc.data(*child) {
            NodeData::Text(text) => !text.trim().is_empty(),
            _ => false,
        });
        if has_text {
            return None;
        }
        let mut elements = doc.element_children(id);
        let only = elements.next()?;
        if elements.next().is_some() || doc.tag(only) != Some("img") {
            return None;
        }
        self.dom.is_valid_image(only).then_some(only)
    }

    fn first_image_label(&self, id: NodeId) -> Option<String> {
        let doc = self.dom.doc;
        doc.descendants(id)
            .filter(|node| doc.tag(*node) == Some("img"))
            .find_map(|image| self.image_label(image))
    }
}
