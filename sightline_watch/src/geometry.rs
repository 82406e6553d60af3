// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host geometry seam and content-space conversion helpers.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Rect;

/// Geometry source for the scan engine.
///
/// Implementors own the real elements; the engine only sees small `Copy`
/// handles. All rectangles live in a root's **content space**: the origin
/// is the root's scrolled content origin, so a target's bounds are stable
/// under pure scrolling and only change on true layout mutation. The
/// root's window is the currently visible part of that space:
/// `[scroll_x, scroll_x + width] × [scroll_y, scroll_y + height]`.
pub trait ViewHost {
    /// Handle for an observed element.
    type Target: Copy + Eq + Hash + Debug;
    /// Handle for a scrollable container.
    type Root: Copy + Eq + Hash + Debug;

    /// Bounds of `target` in `root`'s content space, or `None` while the
    /// target is detached or otherwise unmeasurable.
    fn target_bounds(&self, target: Self::Target, root: Self::Root) -> Option<Rect>;

    /// The currently visible window of `root`, in the same content space.
    fn root_window(&self, root: Self::Root) -> Rect;
}

/// Converts a window-relative target rectangle into root content space.
///
/// Hosts that measure in viewport coordinates (the usual client-rect
/// shape) pass the target's and root's window-relative rectangles plus the
/// root's scroll offsets; the result is stable under scrolling.
#[must_use]
pub fn content_bounds(target_view: Rect, root_view: Rect, scroll_x: f64, scroll_y: f64) -> Rect {
    let dx = scroll_x - root_view.x0;
    let dy = scroll_y - root_view.y0;
    Rect::new(
        target_view.x0 + dx,
        target_view.y0 + dy,
        target_view.x1 + dx,
        target_view.y1 + dy,
    )
}

/// The visible window of a root in its own content space.
#[must_use]
pub fn content_window(root_view: Rect, scroll_x: f64, scroll_y: f64) -> Rect {
    Rect::new(
        scroll_x,
        scroll_y,
        scroll_x + root_view.width(),
        scroll_y + root_view.height(),
    )
}

#[cfg(test)]
mod tests {
    use super::{content_bounds, content_window};
    use kurbo::Rect;

    #[test]
    fn content_space_is_stable_under_scrolling() {
        let root_view = Rect::new(10.0, 20.0, 210.0, 320.0);

        // A target measured 50px below the root's top edge while scrolled
        // to 400 sits at 420 in content space…
        let target_view = Rect::new(10.0, 70.0, 110.0, 120.0);
        let a = content_bounds(target_view, root_view, 0.0, 400.0);
        assert_eq!(a, Rect::new(0.0, 450.0, 100.0, 500.0));

        // …and at the same place after scrolling another 100px, when its
        // window-relative measurement moved up by the same amount.
        let target_view = Rect::new(10.0, -30.0, 110.0, 20.0);
        let b = content_bounds(target_view, root_view, 0.0, 500.0);
        assert_eq!(a, b);
    }

    #[test]
    fn window_tracks_scroll_offsets() {
        let root_view = Rect::new(10.0, 20.0, 210.0, 320.0);
        let w = content_window(root_view, 0.0, 400.0);
        assert_eq!(w, Rect::new(0.0, 400.0, 200.0, 700.0));
    }
}
