//! Viewport intersection test.

use crate::dom::{Document, NodeId, Rect, Viewport};
use crate::options::ExtractOptions;

/// Thresholds that make a partially visible element count as in the viewport.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Thresholds {
    /// Absolute visible area in px².
    pub(crate) min_area: f64,
    /// Visible fraction of the element's own area.
    pub(crate) min_ratio: f64,
}

impl From<&ExtractOptions> for Thresholds {
    fn from(options: &ExtractOptions) -> Self {
        Self {
            min_area: options.min_visible_area,
            min_ratio: options.min_visible_ratio,
        }
    }
}

/// Whether `rect` is significantly visible inside `viewport`.
///
/// Either threshold suffices, so large elements qualify through their visible
/// area and small ones through their visible fraction.
pub(crate) fn is_rect_in_viewport(rect: &Rect, viewport: Viewport, thresholds: Thresholds) -> bool {
    if rect.bottom() <= 0.0 || rect.top() >= viewport.height || rect.right() <= 0.0 || rect.left() >= viewport.width {
        return false;
    }
    let visible_area = rect.intersection(&viewport.rect()).map_or(0.0, |visible| visible.area());
    let total_area = rect.area();
    let ratio = if total_area > 0.0 { visible_area / total_area } else { 0.0 };
    visible_area >= thresholds.min_area || ratio >= thresholds.min_ratio
}

/// Viewport test for an element; non-element nodes are never in the viewport.
pub(crate) fn is_in_viewport(doc: &Document, id: NodeId, thresholds: Thresholds) -> bool {
    doc.element(id)
        .is_some_and(|element| is_rect_in_viewport(&element.layout.rect, doc.viewport(), thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: Thresholds = Thresholds {
        min_area: 100.0,
        min_ratio: 0.1,
    };

    fn viewport() -> Viewport {
        Viewport {
            width: 1000.0,
            height: 800.0,
        }
    }

    #[test]
    fn test_fully_visible() {
        assert!(is_rect_in_viewport(&Rect::new(10.0, 10.0, 300.0, 200.0), viewport(), DEFAULTS));
    }

    #[test]
    fn test_outside_is_rejected_early() {
        assert!(!is_rect_in_viewport(&Rect::new(0.0, 900.0, 300.0, 200.0), viewport(), DEFAULTS));
        assert!(!is_rect_in_viewport(&Rect::new(0.0, -200.0, 300.0, 200.0), viewport(), DEFAULTS));
        assert!(!is_rect_in_viewport(&Rect::new(1000.0, 0.0, 300.0, 200.0), viewport(), DEFAULTS));
    }

    #[test]
    fn test_sliver_of_large_element_fails_both_thresholds() {
        // 100x100 element with a 60px² sliver above the fold.
        let rect = Rect::new(0.0, 799.4, 100.0, 100.0);
        assert!(!is_rect_in_viewport(&rect, viewport(), DEFAULTS));
    }

    #[test]
    fn test_absolute_area_qualifies_large_element() {
        // 150px² of a 100x2000 element shows: far below the ratio, enough area.
        let rect = Rect::new(0.0, 798.5, 100.0, 2000.0);
        assert!(is_rect_in_viewport(&rect, viewport(), DEFAULTS));
    }

    #[test]
    fn test_ratio_qualifies_small_element() {
        let rect = Rect::new(995.0, 10.0, 8.0, 8.0);
        assert!(is_rect_in_viewport(&rect, viewport(), DEFAULTS));
    }

    #[test]
    fn test_zero_area_element() {
        assert!(!is_rect_in_viewport(&Rect::new(10.0, 10.0, 0.0, 0.0), viewport(), DEFAULTS));
    }
}
