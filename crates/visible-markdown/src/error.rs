//! Error types for document loading and content extraction.

use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while loading a document or extracting content from it.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// HTML could not be parsed into a document tree.
    #[error("HTML parsing error: {0}")]
    Parse(String),

    /// A page snapshot could not be decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// An extraction option was out of range.
    #[error("Invalid option `{name}`: {reason}")]
    InvalidOption {
        /// Option name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The traversal exceeded the configured nesting limit.
    #[error("Maximum nesting depth of {0} exceeded")]
    DepthLimit(usize),

    /// I/O error while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
