//! Block-level element handlers.

mod code;
mod heading;
mod list;
mod table;

pub(crate) use heading::heading_level;
