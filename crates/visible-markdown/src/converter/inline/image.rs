//! Images.

use tracing::debug;

use crate::converter::context::{Context, ProcessResult};
use crate::converter::main::Synthesizer;
use crate::converter::markdown;
use crate::converter::resolver::image_alt_text;
use crate::dom::NodeId;

impl Synthesizer<'_> {
    /// Render an image with a usable source as a block.
    pub(crate) fn process_image(&mut self, id: NodeId, ctx: &Context) -> Option<ProcessResult> {
        if !self.within_viewport(id, ctx) {
            return None;
        }
        let Some(source) = self.dom.image_source(id) else {
            debug!(node = id.index(), "skipping image without a usable source");
            return None;
        };
        let alt = image_alt_text(self.dom.doc, self.dom.options, id, &source);
        ProcessResult::block(markdown::image(&alt, &source), id)
    }

    /// Alt text of a valid image, for use as a link label.
    pub(crate) fn image_label(&self, id: NodeId) -> Option<String> {
        if !self.dom.is_valid_image(id) {
            return None;
        }
        let source = self.dom.image_source(id)?;
        Some(image_alt_text(self.dom.doc, self.dom.options, id, &source))
    }
}
