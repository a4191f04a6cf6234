//! Visibility-aware extraction of page content as Markdown.
//!
//! Given a laid-out [`Document`], [`extract`] finds the outermost visible
//! content elements and renders them as Markdown: headings, paragraphs, lists,
//! links, images, code and tables. Hidden elements, page chrome and injected
//! overlays are skipped; in [`Scope::Viewport`] mode only content that is
//! significantly visible on screen is kept.
//!
//! ```
//! use visible_markdown::{ExtractOptions, HtmlLoadOptions, Scope, extract_html};
//!
//! let html = "<h2><a href=\"/x\">Title</a></h2><p>Hello <b>world</b></p>";
//! let markdown = extract_html(html, &HtmlLoadOptions::default(), &ExtractOptions::with_scope(Scope::All)).unwrap();
//! assert_eq!(markdown, "## [Title](/x)\n\nHello **world**");
//! ```

mod converter;
pub mod dom;
pub mod error;
pub mod options;

pub use converter::extract;
pub use dom::{
    ComputedStyle, Document, Element, HtmlLoadOptions, Layout, NodeData, NodeId, PageSnapshot, Rect, SnapshotNode,
    Viewport,
};
pub use error::{ExtractError, Result};
pub use options::{ExtractOptions, Scope};

/// Crate version, as reported to hosts embedding the extractor.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the extractor.
#[must_use]
pub const fn version() -> &'static str {
    VERSION
}

/// Parse `html` with static layout and extract its content.
///
/// # Errors
///
/// Returns an error when the HTML cannot be parsed or the load options are
/// invalid. Extraction itself never fails; see [`extract`].
pub fn extract_html(html: &str, load_options: &HtmlLoadOptions, options: &ExtractOptions) -> Result<String> {
    let document = Document::parse_html(html, load_options)?;
    Ok(extract(&document, options))
}

/// Decode a page snapshot and extract its content.
///
/// # Errors
///
/// Returns [`ExtractError::Snapshot`] when the JSON is not a valid snapshot.
pub fn extract_snapshot(json: &str, options: &ExtractOptions) -> Result<String> {
    let document = Document::from_snapshot_json(json)?;
    Ok(extract(&document, options))
}
