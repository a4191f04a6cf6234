//! Structure inferred from computed style for elements without a semantic tag.

use crate::dom::{ComputedStyle, Document, NodeId};

/// Font size relative to the root at which styled text reads as a heading.
const HEADING_MIN_RATIO: f64 = 1.2;

/// Weight at which text counts as bold.
const BOLD_WEIGHT: u16 = 600;

/// Heading level for text styled like a heading, `None` for body text.
///
/// Larger fonts map to lower levels; a weight of 700 or more promotes the
/// heading by one level.
pub(crate) fn infer_heading_level(style: &ComputedStyle, base_font_size: f64) -> Option<u8> {
    if base_font_size <= 0.0 || style.font_weight < BOLD_WEIGHT {
        return None;
    }
    let ratio = style.font_size / base_font_size;
    if ratio < HEADING_MIN_RATIO {
        return None;
    }
    let level: u8 = if ratio >= 2.0 {
        1
    } else if ratio >= 1.6 {
        2
    } else if ratio >= 1.4 {
        3
    } else if ratio >= 1.3 {
        4
    } else if ratio >= 1.25 {
        5
    } else {
        6
    };
    if style.font_weight >= 700 {
        Some(level.saturating_sub(1).max(1))
    } else {
        Some(level)
    }
}

pub(crate) fn is_css_bold(style: &ComputedStyle) -> bool {
    style.font_weight >= BOLD_WEIGHT
}

pub(crate) fn is_css_italic(style: &ComputedStyle) -> bool {
    style.is_italic()
}

/// Whether the computed display generates a block-level box.
pub(crate) fn is_block_display(style: &ComputedStyle) -> bool {
    !style.display.starts_with("inline") && style.display != "contents" && style.display != "none"
}

/// Whether any element child generates a block box.
pub(crate) fn has_block_child(doc: &Document, id: NodeId) -> bool {
    doc.element_children(id).any(|child| {
        doc.element(child)
            .is_some_and(|element| !is_inline_tag(&element.tag) && is_block_display(&element.style))
    })
}

/// Tags rendered inline by default.
pub(crate) fn is_inline_tag(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "abbr"
            | "b"
            | "bdi"
            | "bdo"
            | "br"
            | "cite"
            | "code"
            | "data"
            | "dfn"
            | "del"
            | "em"
            | "font"
            | "i"
            | "img"
            | "ins"
            | "kbd"
            | "label"
            | "mark"
            | "picture"
            | "q"
            | "s"
            | "samp"
            | "small"
            | "span"
            | "strike"
            | "strong"
            | "sub"
            | "sup"
            | "time"
            | "tt"
            | "u"
            | "var"
            | "wbr"
    )
}
