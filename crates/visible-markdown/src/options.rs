//! Configuration options for content extraction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Which part of the page is eligible for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Every hard-visible element, regardless of scroll position.
    All,
    /// Only content whose visible portion inside the viewport is significant.
    #[default]
    Viewport,
}

impl Scope {
    /// Returns the lowercase name used on the command line and in snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Viewport => "viewport",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ExtractError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "viewport" => Ok(Self::Viewport),
            other => Err(ExtractError::InvalidOption {
                name: "scope",
                reason: format!("expected `all` or `viewport`, got `{other}`"),
            }),
        }
    }
}

/// Main extraction options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractOptions {
    /// Extraction scope.
    pub scope: Scope,

    /// Minimum number of characters for text to count as non-trivial.
    pub min_text_length: usize,

    /// Visible area (px²) that qualifies an element as in the viewport on its own.
    pub min_visible_area: f64,

    /// Visible fraction of the element that qualifies it as in the viewport on its own.
    pub min_visible_ratio: f64,

    /// Maximum element nesting processed before a subtree is abandoned.
    pub max_depth: usize,

    /// Maximum alt text length in characters; longer text is cut with an ellipsis.
    pub max_alt_length: usize,

    /// Maximum length of a `data:` image URL that may be emitted.
    pub max_data_uri_length: usize,

    /// Class-name prefixes marking injected overlay elements that must never be extracted.
    pub ignored_class_markers: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            scope: Scope::Viewport,
            min_text_length: 2,
            min_visible_area: 100.0,
            min_visible_ratio: 0.1,
            max_depth: 128,
            max_alt_length: 120,
            max_data_uri_length: 4096,
            ignored_class_markers: vec!["vm-ignore".to_string(), "vm-overlay".to_string(), "vm-marker".to_string()],
        }
    }
}

impl ExtractOptions {
    /// Options for the given scope with every other value at its default.
    #[must_use]
    pub fn with_scope(scope: Scope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Check that every threshold is within its meaningful range.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidOption`] naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_visible_ratio) {
            return Err(ExtractError::InvalidOption {
                name: "min_visible_ratio",
                reason: format!("must be within 0.0..=1.0, got {}", self.min_visible_ratio),
            });
        }
        if !self.min_visible_area.is_finite() || self.min_visible_area < 0.0 {
            return Err(ExtractError::InvalidOption {
                name: "min_visible_area",
                reason: format!("must be a non-negative number, got {}", self.min_visible_area),
            });
        }
        if self.max_depth == 0 {
            return Err(ExtractError::InvalidOption {
                name: "max_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_alt_length == 0 {
            return Err(ExtractError::InvalidOption {
                name: "max_alt_length",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.ignored_class_markers.iter().any(|marker| marker.trim().is_empty()) {
            return Err(ExtractError::InvalidOption {
                name: "ignored_class_markers",
                reason: "markers must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
