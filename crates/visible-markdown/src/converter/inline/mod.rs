//! Inline element handlers.

mod image;
mod link;

use crate::converter::context::{Context, ProcessResult};
use crate::converter::main::{Emphasis, Synthesizer};
use crate::converter::markdown;
use crate::converter::text::clean_text;
use crate::dom::NodeId;

/// Whether `text` is exactly one span delimited by `marker`.
fn is_wrapped_in(text: &str, marker: &str) -> bool {
    let Some(inner) = text.strip_prefix(marker).and_then(|rest| rest.strip_suffix(marker)) else {
        return false;
    };
    let marker_char = marker.chars().next();
    !inner.is_empty()
        && !inner.contains(marker)
        && inner.chars().next() != marker_char
        && inner.chars().last() != marker_char
}

/// Drop nested spans of the same emphasis. For `*`, only lone asterisks are
/// removed so that `**` spans survive.
fn strip_marker(text: &str, marker: &str) -> String {
    if marker != "*" {
        return text.replace(marker, "");
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|&(i, ch)| {
            *ch != '*'
                || (i > 0 && chars[i - 1] == '*')
                || chars.get(i + 1) == Some(&'*')
        })
        .map(|(_, ch)| *ch)
        .collect()
}

impl Synthesizer<'_> {
    /// Wrap inline content in emphasis markers. Content that already renders
    /// as a block, or already carries the same markers, is returned unchanged.
    pub(crate) fn process_emphasis(&mut self, id: NodeId, emphasis: Emphasis, ctx: &Context) -> Option<ProcessResult> {
        let content = self.combine_children(id, ctx)?;
        if content.is_block {
            return Some(content);
        }
        let marker = match emphasis {
            Emphasis::Bold => "**",
            Emphasis::Italic => "*",
            Emphasis::Strikethrough => "~~",
        };
        let trimmed = content.markdown.trim();
        if is_wrapped_in(trimmed, marker) {
            return Some(content);
        }
        // Code spans may legitimately contain the marker.
        let body = if trimmed.contains(marker) && !trimmed.contains('`') {
            strip_marker(&content.markdown, marker)
        } else {
            content.markdown
        };
        let wrapped = match emphasis {
            Emphasis::Bold => markdown::bold(&body),
            Emphasis::Italic => markdown::italic(&body),
            Emphasis::Strikethrough => markdown::strikethrough(&body),
        };
        ProcessResult::inline(wrapped, id)
    }

    /// Render `<code>` outside `<pre>` as a code span of its collapsed text.
    pub(crate) fn process_inline_code(&mut self, id: NodeId, ctx: &Context) -> Option<ProcessResult> {
        if !self.within_viewport(id, ctx) {
            return None;
        }
        let text = clean_text(&self.dom.doc.text_content(id));
        self.mark_subtree_visited(id);
        if text.is_empty() {
            return None;
        }
        ProcessResult::inline(markdown::inline_code(&text), id)
    }
}
