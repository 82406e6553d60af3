// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coverage ratios and the threshold predicate.

use kurbo::Rect;

/// How a coverage ratio is measured against the viewport window.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CoverageMode {
    /// Overlap area over `min(target area, window area)`.
    ///
    /// The minimum denominator lets a target larger than its viewport
    /// still reach coverage `1.0` once it fills the window.
    #[default]
    Area,
    /// Covered fraction of the target's height (zero without horizontal
    /// overlap).
    Height,
    /// Covered fraction of the target's width (zero without vertical
    /// overlap).
    Width,
}

/// Fraction of `target` visible inside `window`, in `[0, 1]`.
///
/// Inputs are expected to be well-formed rectangles (`x0 <= x1`,
/// `y0 <= y1`) in the same coordinate space; degenerate targets or windows
/// yield `0.0`.
#[must_use]
pub fn coverage(target: Rect, window: Rect, mode: CoverageMode) -> f64 {
    let w = (target.x1.min(window.x1) - target.x0.max(window.x0)).max(0.0);
    let h = (target.y1.min(window.y1) - target.y0.max(window.y0)).max(0.0);
    match mode {
        CoverageMode::Area => {
            let denom = (target.width() * target.height()).min(window.width() * window.height());
            if denom <= 0.0 {
                0.0
            } else {
                ((w * h) / denom).clamp(0.0, 1.0)
            }
        }
        CoverageMode::Height => {
            if w <= 0.0 || target.height() <= 0.0 {
                0.0
            } else {
                (h / target.height()).clamp(0.0, 1.0)
            }
        }
        CoverageMode::Width => {
            if h <= 0.0 || target.width() <= 0.0 {
                0.0
            } else {
                (w / target.width()).clamp(0.0, 1.0)
            }
        }
    }
}

/// Whether a coverage ratio satisfies a threshold.
///
/// The boundary is inclusive: a ratio exactly equal to the threshold
/// counts. A threshold of zero means "any positive overlap".
#[must_use]
pub fn ratio_meets(ratio: f64, threshold: f64) -> bool {
    if threshold <= 0.0 {
        ratio > 0.0
    } else {
        ratio >= threshold
    }
}

/// Whether `target` is in view inside `window` for the given threshold.
#[must_use]
pub fn in_view(target: Rect, window: Rect, threshold: f64, mode: CoverageMode) -> bool {
    ratio_meets(coverage(target, window, mode), threshold)
}

#[cfg(test)]
mod tests {
    use super::{CoverageMode, coverage, in_view, ratio_meets};
    use kurbo::Rect;

    const WINDOW: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    #[test]
    fn area_coverage_of_partial_overlap() {
        // A 40×40 target with its lower-right quarter inside the window.
        let target = Rect::new(-20.0, -20.0, 20.0, 20.0);
        let c = coverage(target, WINDOW, CoverageMode::Area);
        assert!((c - 0.25).abs() < 1e-12);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // Exactly half the target is inside the window.
        let target = Rect::new(0.0, 50.0, 100.0, 150.0);
        assert!(in_view(target, WINDOW, 0.5, CoverageMode::Area));
        assert!(!in_view(target, WINDOW, 0.5 + 1e-9, CoverageMode::Area));
    }

    #[test]
    fn zero_threshold_requires_positive_overlap() {
        let outside = Rect::new(0.0, 200.0, 50.0, 250.0);
        let touching = Rect::new(0.0, 100.0, 50.0, 150.0);
        let peeking = Rect::new(0.0, 99.0, 50.0, 150.0);
        assert!(!in_view(outside, WINDOW, 0.0, CoverageMode::Area));
        assert!(!in_view(touching, WINDOW, 0.0, CoverageMode::Area));
        assert!(in_view(peeking, WINDOW, 0.0, CoverageMode::Area));
    }

    #[test]
    fn oversized_target_can_reach_full_coverage() {
        // Four times the window's area, but the window is fully covered.
        let target = Rect::new(-50.0, -50.0, 150.0, 150.0);
        let c = coverage(target, WINDOW, CoverageMode::Area);
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn side_modes_measure_one_axis() {
        // 30 of 60 vertical units visible, full horizontal overlap.
        let target = Rect::new(10.0, 70.0, 90.0, 130.0);
        let c = coverage(target, WINDOW, CoverageMode::Height);
        assert!((c - 0.5).abs() < 1e-12);

        // No horizontal overlap: nothing of the height is visible.
        let offscreen = Rect::new(200.0, 70.0, 280.0, 130.0);
        assert_eq!(coverage(offscreen, WINDOW, CoverageMode::Height), 0.0);

        let wide = Rect::new(60.0, 10.0, 140.0, 90.0);
        let c = coverage(wide, WINDOW, CoverageMode::Width);
        assert!((c - 0.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_rects_never_pass() {
        let flat = Rect::new(10.0, 10.0, 90.0, 10.0);
        assert_eq!(coverage(flat, WINDOW, CoverageMode::Area), 0.0);
        assert!(!ratio_meets(0.0, 0.0));
        assert!(ratio_meets(1e-9, 0.0));
    }
}
