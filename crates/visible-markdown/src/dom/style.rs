//! Computed style subset consulted by the extractor.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default font size of the root element in px.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

static CLIP_RECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^rect\(\s*([^,\s)]+)[,\s]+([^,\s)]+)[,\s]+([^,\s)]+)[,\s]+([^,\s)]+)\s*\)$")
        .expect("CLIP_RECT: hardcoded regex is valid")
});

static CLIP_PATH_INSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^inset\(\s*([\d.]+)%").expect("CLIP_PATH_INSET: hardcoded regex is valid"));

static CLIP_PATH_ZERO_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:circle|ellipse)\(\s*0(?:px|%)?(?:\s+0(?:px|%)?)?(?:\s|\)|$)")
        .expect("CLIP_PATH_ZERO_SHAPE: hardcoded regex is valid")
});

/// The computed style properties the extractor needs.
///
/// Inherited properties (`visibility`, font size/weight/style) are resolved
/// against the parent when the style is built; `display`, `opacity` and the
/// clipping properties always start from their initial values.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    /// Computed `display`.
    pub display: String,
    /// Computed `visibility`.
    pub visibility: String,
    /// Computed `opacity` in `0.0..=1.0`.
    pub opacity: f64,
    /// Computed `clip`, `None` for `auto`.
    pub clip: Option<String>,
    /// Computed `clip-path`, `None` for `none`.
    pub clip_path: Option<String>,
    /// Font size in px.
    pub font_size: f64,
    /// Numeric font weight.
    pub font_weight: u16,
    /// Computed `font-style`.
    pub font_style: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "inline".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
            clip: None,
            clip_path: None,
            font_size: DEFAULT_FONT_SIZE,
            font_weight: 400,
            font_style: "normal".to_string(),
        }
    }
}

impl ComputedStyle {
    /// Start a child style: inherited properties copied, others reset.
    #[must_use]
    pub fn inherit_from(parent: &Self) -> Self {
        Self {
            visibility: parent.visibility.clone(),
            font_size: parent.font_size,
            font_weight: parent.font_weight,
            font_style: parent.font_style.clone(),
            ..Self::default()
        }
    }

    /// Apply one CSS declaration.
    ///
    /// `parent_font_size` resolves `em`/`%` font sizes, `root_font_size` resolves `rem`.
    /// Unknown properties and unparsable values are ignored, like a browser would.
    pub fn apply(&mut self, property: &str, value: &str, parent_font_size: f64, root_font_size: f64) {
        let value = value.trim().trim_end_matches("!important").trim();
        if value.is_empty() {
            return;
        }
        let lower = value.to_ascii_lowercase();
        match property.trim().to_ascii_lowercase().as_str() {
            "display" => self.display = lower,
            "visibility" => self.visibility = lower,
            "opacity" => {
                let parsed = lower
                    .strip_suffix('%')
                    .map_or_else(|| lower.parse::<f64>().ok(), |pct| pct.parse::<f64>().ok().map(|p| p / 100.0));
                if let Some(opacity) = parsed {
                    self.opacity = opacity.clamp(0.0, 1.0);
                }
            }
            "clip" => self.clip = (lower != "auto").then_some(lower),
            "clip-path" => self.clip_path = (lower != "none").then_some(lower),
            "font-size" => {
                if let Some(size) = parse_font_size(&lower, parent_font_size, root_font_size) {
                    self.font_size = size;
                }
            }
            "font-weight" => {
                if let Some(weight) = parse_font_weight(&lower, self.font_weight) {
                    self.font_weight = weight;
                }
            }
            "font-style" => self.font_style = lower,
            _ => {}
        }
    }

    /// `display: none`.
    #[must_use]
    pub fn is_display_none(&self) -> bool {
        self.display == "none"
    }

    /// `visibility: hidden` or `collapse`.
    #[must_use]
    pub fn is_visibility_hidden(&self) -> bool {
        matches!(self.visibility.as_str(), "hidden" | "collapse")
    }

    /// Opacity close enough to zero to be invisible.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.opacity < 0.01
    }

    /// Whether `clip` or `clip-path` removes the whole box.
    #[must_use]
    pub fn is_fully_clipped(&self) -> bool {
        if let Some(clip) = &self.clip {
            if let Some(caps) = CLIP_RECT.captures(clip) {
                let edge = |idx: usize| caps.get(idx).and_then(|m| parse_px(m.as_str()));
                if let (Some(top), Some(right), Some(bottom), Some(left)) = (edge(1), edge(2), edge(3), edge(4)) {
                    if bottom <= top || right <= left {
                        return true;
                    }
                }
            }
        }
        if let Some(clip_path) = &self.clip_path {
            if let Some(caps) = CLIP_PATH_INSET.captures(clip_path) {
                if caps
                    .get(1)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .is_some_and(|pct| pct >= 50.0)
                {
                    return true;
                }
            }
            if CLIP_PATH_ZERO_SHAPE.is_match(clip_path) {
                return true;
            }
        }
        false
    }

    /// Italic or oblique font style.
    #[must_use]
    pub fn is_italic(&self) -> bool {
        matches!(self.font_style.as_str(), "italic" | "oblique") || self.font_style.starts_with("oblique ")
    }
}

/// Split an inline `style` attribute into `(property, value)` pairs.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

/// Parse a plain pixel length (`12px`, `12`, `0`).
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    let number = value.strip_suffix("px").unwrap_or(&value).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a CSS length into px, resolving relative units against the given font sizes.
pub fn parse_length(value: &str, font_size: f64, root_font_size: f64) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    let (number, factor) = if let Some(n) = value.strip_suffix("rem") {
        (n, root_font_size)
    } else if let Some(n) = value.strip_suffix("em") {
        (n, font_size)
    } else if let Some(n) = value.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else if let Some(n) = value.strip_suffix('%') {
        (n, font_size / 100.0)
    } else if let Some(n) = value.strip_suffix("px") {
        (n, 1.0)
    } else {
        (value.as_str(), 1.0)
    };
    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n * factor)
}

fn parse_font_size(value: &str, parent_font_size: f64, root_font_size: f64) -> Option<f64> {
    let keyword = match value {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(DEFAULT_FONT_SIZE),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "xxx-large" => Some(48.0),
        "smaller" => Some(parent_font_size / 1.2),
        "larger" => Some(parent_font_size * 1.2),
        _ => None,
    };
    keyword
        .or_else(|| parse_length(value, parent_font_size, root_font_size))
        .filter(|size| *size >= 0.0)
}

fn parse_font_weight(value: &str, parent_weight: u16) -> Option<u16> {
    match value {
        "normal" => Some(400),
        "bold" => Some(700),
        "bolder" => Some(match parent_weight {
            0..=349 => 400,
            350..=549 => 700,
            _ => 900,
        }),
        "lighter" => Some(match parent_weight {
            0..=549 => 100,
            550..=749 => 400,
            _ => 700,
        }),
        other => other.parse::<f64>().ok().filter(|w| (1.0..=1000.0).contains(w)).map(|w| w.round() as u16),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_with(declarations: &str) -> ComputedStyle {
        let mut style = ComputedStyle::default();
        for (name, value) in parse_declarations(declarations) {
            style.apply(&name, &value, DEFAULT_FONT_SIZE, DEFAULT_FONT_SIZE);
        }
        style
    }

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations("display: none; COLOR:red;;broken; width : 10px");
        assert_eq!(
            decls,
            vec![
                ("display".to_string(), "none".to_string()),
                ("color".to_string(), "red".to_string()),
                ("width".to_string(), "10px".to_string()),
            ]
        );
    }

    #[test]
    fn test_hidden_states() {
        assert!(style_with("display:none").is_display_none());
        assert!(style_with("visibility: hidden").is_visibility_hidden());
        assert!(style_with("opacity: 0").is_transparent());
        assert!(style_with("opacity: 0.5%").is_transparent());
        assert!(!style_with("opacity: 0.4").is_transparent());
    }

    #[test]
    fn test_clip_detection() {
        assert!(style_with("clip: rect(0 0 0 0)").is_fully_clipped());
        assert!(style_with("clip: rect(1px, 1px, 1px, 1px)").is_fully_clipped());
        assert!(!style_with("clip: rect(0px, 100px, 50px, 0px)").is_fully_clipped());
        assert!(style_with("clip-path: inset(50%)").is_fully_clipped());
        assert!(style_with("clip-path: circle(0)").is_fully_clipped());
        assert!(!style_with("clip-path: inset(10%)").is_fully_clipped());
        assert!(!style_with("clip: auto").is_fully_clipped());
    }

    #[test]
    fn test_font_size_units() {
        let mut style = ComputedStyle::default();
        style.apply("font-size", "2em", 20.0, 16.0);
        assert!((style.font_size - 40.0).abs() < f64::EPSILON);
        style.apply("font-size", "1.5rem", 20.0, 16.0);
        assert!((style.font_size - 24.0).abs() < f64::EPSILON);
        style.apply("font-size", "150%", 20.0, 16.0);
        assert!((style.font_size - 30.0).abs() < f64::EPSILON);
        style.apply("font-size", "x-large", 20.0, 16.0);
        assert!((style.font_size - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(style_with("font-weight: bold").font_weight, 700);
        assert_eq!(style_with("font-weight: 600").font_weight, 600);
        assert_eq!(style_with("font-weight: bolder").font_weight, 700);
        assert_eq!(style_with("font-weight: heavy").font_weight, 400);
    }

    #[test]
    fn test_inherit_resets_non_inherited() {
        let parent = style_with("display:block; opacity:0.5; visibility:hidden; font-style: italic");
        let child = ComputedStyle::inherit_from(&parent);
        assert_eq!(child.display, "inline");
        assert!((child.opacity - 1.0).abs() < f64::EPSILON);
        assert!(child.is_visibility_hidden());
        assert!(child.is_italic());
    }
}
