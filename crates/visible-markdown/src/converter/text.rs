//! Plain-text transforms over text nodes and emitted Markdown.

use once_cell::sync::Lazy;
use regex::Regex;

static IMAGE_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\[\]]*)\]\([^()\s]*\)").expect("IMAGE_SYNTAX: hardcoded regex is valid"));

static LINK_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]*)\]\([^()\s]*\)").expect("LINK_SYNTAX: hardcoded regex is valid"));

static BOLD_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+?)\*\*|__([^_]+?)__").expect("BOLD_SYNTAX: hardcoded regex is valid"));

static ITALIC_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("ITALIC_SYNTAX: hardcoded regex is valid"));

static STRIKE_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"~~([^~]+?)~~").expect("STRIKE_SYNTAX: hardcoded regex is valid"));

static HEADING_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s+").expect("HEADING_SYNTAX: hardcoded regex is valid"));

static QUOTE_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*>\s?").expect("QUOTE_SYNTAX: hardcoded regex is valid"));

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("EXCESS_NEWLINES: hardcoded regex is valid"));

/// Nesting depth of link syntax that [`strip_markdown`] unwraps.
const MAX_LINK_NESTING: usize = 3;

/// Collapse whitespace runs to single spaces and trim.
pub(crate) fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Remove Markdown syntax produced by the generator, leaving plain text.
///
/// Images become their alt text and links their label (unwrapping up to three
/// levels of nesting); emphasis, strikethrough, code spans, heading markers and
/// quote markers are dropped. Whitespace is collapsed in the result.
pub(crate) fn strip_markdown(markdown: &str) -> String {
    let mut text = IMAGE_SYNTAX.replace_all(markdown, "$1").into_owned();
    for _ in 0..MAX_LINK_NESTING {
        let replaced = LINK_SYNTAX.replace_all(&text, "$1");
        if replaced == text {
            break;
        }
        text = replaced.into_owned();
    }
    text = strip_code_spans(&text);
    text = BOLD_SYNTAX.replace_all(&text, "$1$2").into_owned();
    text = ITALIC_SYNTAX.replace_all(&text, "$1").into_owned();
    text = STRIKE_SYNTAX.replace_all(&text, "$1").into_owned();
    text = HEADING_SYNTAX.replace_all(&text, "").into_owned();
    text = QUOTE_SYNTAX.replace_all(&text, "").into_owned();
    clean_text(&text)
}

/// Replace code spans with their content.
///
/// A span opens with a run of backticks and closes at the next run of the same
/// length, so spans fenced with longer runs may contain shorter ones. A single
/// space of padding on both sides is dropped. Unmatched runs stay literal.
fn strip_code_spans(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let open = i;
        i = backtick_run_end(bytes, i);
        let fence = i - open;
        if let Some(close) = find_closing_fence(bytes, i, fence) {
            out.push_str(&text[copied..open]);
            out.push_str(trim_code_padding(&text[i..close]));
            i = close + fence;
            copied = i;
        }
    }
    out.push_str(&text[copied..]);
    out
}

fn backtick_run_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && bytes[end] == b'`' {
        end += 1;
    }
    end
}

/// Start of the next backtick run of exactly `fence` characters at or after `from`.
fn find_closing_fence(bytes: &[u8], from: usize, fence: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let end = backtick_run_end(bytes, i);
            if end - i == fence {
                return Some(i);
            }
            i = end;
        } else {
            i += 1;
        }
    }
    None
}

fn trim_code_padding(code: &str) -> &str {
    match code.strip_prefix(' ').and_then(|rest| rest.strip_suffix(' ')) {
        Some(inner) if !inner.trim().is_empty() => inner,
        _ => code,
    }
}

/// Flatten cell Markdown onto one line and escape pipes.
pub(crate) fn escape_table_cell(markdown: &str) -> String {
    clean_text(markdown).replace('|', r"\|")
}

/// Collapse three or more consecutive newlines to exactly two.
pub(crate) fn collapse_newlines(markdown: &str) -> String {
    EXCESS_NEWLINES.replace_all(markdown, "\n\n").into_owned()
}

/// Cut `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub(crate) fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str("...");
    out
}

/// Whether `text` has at least `min_chars` non-whitespace-padded characters.
pub(crate) fn is_non_trivial(text: &str, min_chars: usize) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().count() >= min_chars
}
