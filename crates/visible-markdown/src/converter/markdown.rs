//! Markdown generators.
//!
//! Pure string functions, one per construct. Block constructs end with a
//! blank line (`"\n\n"`); inline constructs carry no surrounding whitespace.

/// `#`-prefixed heading; `level` is clamped to `1..=6`.
pub(crate) fn heading(level: u8, text: &str) -> String {
    let level = usize::from(level.clamp(1, 6));
    format!("{} {}\n\n", "#".repeat(level), text.trim())
}

pub(crate) fn paragraph(text: &str) -> String {
    format!("{}\n\n", text.trim())
}

pub(crate) fn bold(text: &str) -> String {
    wrap(text, "**")
}

pub(crate) fn italic(text: &str) -> String {
    wrap(text, "*")
}

pub(crate) fn strikethrough(text: &str) -> String {
    wrap(text, "~~")
}

/// Wrap the trimmed text in `marker`, keeping outer whitespace outside the markers.
fn wrap(text: &str, marker: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let leading = if text.starts_with(char::is_whitespace) { " " } else { "" };
    let trailing = if text.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{leading}{marker}{trimmed}{marker}{trailing}")
}

pub(crate) fn link(text: &str, url: &str) -> String {
    format!("[{}]({url})", text.trim())
}

/// Image syntax; images are rendered as blocks.
pub(crate) fn image(alt: &str, url: &str) -> String {
    format!("![{}]({url})\n\n", alt.trim())
}

/// Code span fenced with one more backtick than the longest run in `code`.
pub(crate) fn inline_code(code: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(code) + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

/// Fenced code block with an optional language tag.
pub(crate) fn code_block(code: &str, language: Option<&str>) -> String {
    let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
    let language = language.unwrap_or("");
    format!("{fence}{language}\n{}\n{fence}\n\n", code.trim_end_matches('\n'))
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Quote every line; blank lines become a bare `>`.
pub(crate) fn blockquote(text: &str) -> String {
    let mut out = String::new();
    for line in text.trim().lines() {
        if line.trim().is_empty() {
            out.push_str(">\n");
        } else {
            out.push_str("> ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

/// One list item at `level`, two spaces of indentation per level.
///
/// Continuation lines are indented under the marker; lines that already carry
/// indentation (nested list items) are kept as they are, blank lines dropped.
pub(crate) fn list_item(content: &str, level: usize, ordered: bool, index: usize) -> String {
    let indent = "  ".repeat(level);
    let marker = if ordered { format!("{index}.") } else { "-".to_string() };
    let continuation = "  ".repeat(level + 1);

    let mut lines = content.trim().lines().filter(|line| !line.trim().is_empty());
    let mut out = format!("{indent}{marker} {}\n", lines.next().unwrap_or("").trim());
    for line in lines {
        if line.starts_with(char::is_whitespace) {
            out.push_str(line.trim_end());
        } else {
            out.push_str(&continuation);
            out.push_str(line.trim_end());
        }
        out.push('\n');
    }
    out
}

pub(crate) fn horizontal_rule() -> String {
    "---\n\n".to_string()
}

/// `| a | b |`
pub(crate) fn table_row(cells: &[String]) -> String {
    let mut out = String::from("|");
    for cell in cells {
        out.push(' ');
        out.push_str(cell);
        out.push_str(" |");
    }
    out
}

/// `|---|---|`
pub(crate) fn table_separator(columns: usize) -> String {
    format!("|{}", "---|".repeat(columns.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading(2, "Title"), "## Title\n\n");
        assert_eq!(heading(9, " Deep "), "###### Deep\n\n");
        assert_eq!(heading(0, "Top"), "# Top\n\n");
    }

    #[test]
    fn test_emphasis_keeps_outer_whitespace() {
        assert_eq!(bold("strong"), "**strong**");
        assert_eq!(italic(" soft "), " *soft* ");
        assert_eq!(strikethrough("old"), "~~old~~");
        assert_eq!(bold("   "), "");
    }

    #[test]
    fn test_inline_code_fences() {
        assert_eq!(inline_code("let x"), "`let x`");
        assert_eq!(inline_code("a `b` c"), "``a `b` c``");
        assert_eq!(inline_code("`tick"), "`` `tick ``");
    }

    #[test]
    fn test_code_block_fences() {
        assert_eq!(code_block("fn main() {}\n", Some("rust")), "```rust\nfn main() {}\n```\n\n");
        assert_eq!(code_block("```\nx\n```", None), "````\n```\nx\n```\n````\n\n");
    }

    #[test]
    fn test_blockquote_lines() {
        assert_eq!(blockquote("one\n\ntwo"), "> one\n>\n> two\n\n");
    }

    #[test]
    fn test_list_item_indentation() {
        assert_eq!(list_item("Item", 0, false, 0), "- Item\n");
        assert_eq!(list_item("Second", 1, true, 2), "  2. Second\n");
        assert_eq!(
            list_item("Parent\n\n  - Child\n", 0, false, 0),
            "- Parent\n  - Child\n"
        );
        assert_eq!(list_item("First\n\nMore", 0, false, 0), "- First\n  More\n");
    }

    #[test]
    fn test_table_rows() {
        let cells = vec!["A".to_string(), "B".to_string()];
        assert_eq!(table_row(&cells), "| A | B |");
        assert_eq!(table_separator(2), "|---|---|");
    }

    #[test]
    fn test_link_and_image() {
        assert_eq!(link(" Docs ", "https://x.test"), "[Docs](https://x.test)");
        assert_eq!(image("Cat", "/cat.png"), "![Cat](/cat.png)\n\n");
        assert_eq!(horizontal_rule(), "---\n\n");
        assert_eq!(paragraph(" text "), "text\n\n");
    }
}
