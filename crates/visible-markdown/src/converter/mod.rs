//! Visibility-aware conversion of a document into Markdown.
//!
//! The pipeline runs in two passes. The locator finds the outermost visible
//! content elements; the synthesizer then renders each of them recursively,
//! consulting the visibility classifier, the viewport test and the URL
//! resolver along the way.

mod block;
mod context;
mod inline;
mod locator;
mod main;
mod markdown;
mod resolver;
mod style;
mod text;
mod viewport;
mod visibility;

pub use main::extract;
