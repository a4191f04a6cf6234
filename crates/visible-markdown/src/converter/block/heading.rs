//! Headings, declared or inferred.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::converter::context::{Context, ProcessResult};
use crate::converter::main::Synthesizer;
use crate::converter::markdown;
use crate::converter::text::strip_markdown;
use crate::dom::NodeId;

/// Heading content that is exactly one link, optionally labelled by an image.
static SOLE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[((?:[^\[\]]|!\[[^\[\]]*\]\([^()\s]*\))*)\]\(([^()\s]+)\)$")
        .expect("SOLE_LINK: hardcoded regex is valid")
});

/// Level of an `<h1>`..`<h6>` tag.
pub(crate) fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

impl Synthesizer<'_> {
    /// Render a heading as plain text, or as `## [text](url)` when its only
    /// content is a link.
    pub(crate) fn process_heading(&mut self, id: NodeId, level: u8, ctx: &Context) -> Option<ProcessResult> {
        let content = self.combine_children(id, ctx)?;
        let content = content.markdown.trim();

        if let Some(caps) = SOLE_LINK.captures(content) {
            let label = strip_markdown(&caps[1]);
            if !label.is_empty() {
                return ProcessResult::block(markdown::heading(level, &markdown::link(&label, &caps[2])), id);
            }
        }

        let text = strip_markdown(content);
        ProcessResult::block(markdown::heading(level, &text), id)
    }
}
