//! Preformatted code blocks.

use crate::converter::context::{Context, ProcessResult};
use crate::converter::main::Synthesizer;
use crate::converter::markdown;
use crate::dom::{Document, NodeData, NodeId};

/// Language named by a `language-*` or `lang-*` class.
fn class_language(doc: &Document, id: NodeId) -> Option<String> {
    doc.element(id)?.classes().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .filter(|language| !language.is_empty())
            .map(str::to_string)
    })
}

impl Synthesizer<'_> {
    /// Render `<pre>` as a fenced block with the raw text of its `<code>` child
    /// (or of the `<pre>` itself), keeping whitespace and turning `<br>` into
    /// newlines.
    pub(crate) fn process_preformatted(&mut self, id: NodeId, ctx: &Context) -> Option<ProcessResult> {
        if !self.within_viewport(id, ctx) {
            return None;
        }
        let doc = self.dom.doc;
        let code = doc.descendants(id).find(|node| doc.tag(*node) == Some("code"));
        let language = class_language(doc, id).or_else(|| code.and_then(|code| class_language(doc, code)));

        let mut text = String::new();
        for node in doc.descendants(code.unwrap_or(id)) {
            match doc.data(node) {
                NodeData::Text(chunk) => text.push_str(chunk),
                NodeData::Element(element) if element.tag == "br" => text.push('\n'),
                _ => {}
            }
        }
        self.mark_subtree_visited(id);

        let text = text.trim_matches('\n');
        if text.trim().is_empty() {
            return None;
        }
        ProcessResult::block(markdown::code_block(text, language.as_deref()), id)
    }
}
