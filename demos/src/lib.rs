// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared scaffolding for the Sightline demos: a simulated scroll host.

use std::collections::HashMap;

use kurbo::Rect;
use sightline_watch::ViewHost;

/// A simulated scroll container.
///
/// Targets are placed directly in content space; the window is the visible
/// slice of that space and moves with [`SimHost::scroll_to`]. This stands
/// in for a real host environment where bounds would come from layout.
#[derive(Debug)]
pub struct SimHost {
    viewport_width: f64,
    viewport_height: f64,
    scroll_y: f64,
    bounds: HashMap<u32, Rect>,
}

impl SimHost {
    /// Creates a host with the given viewport size, scrolled to the top.
    #[must_use]
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            viewport_width,
            viewport_height,
            scroll_y: 0.0,
            bounds: HashMap::new(),
        }
    }

    /// Places (or moves) a target in content space.
    pub fn place(&mut self, target: u32, rect: Rect) {
        self.bounds.insert(target, rect);
    }

    /// Detaches a target.
    pub fn detach(&mut self, target: u32) {
        self.bounds.remove(&target);
    }

    /// Scrolls the window to a vertical offset.
    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
    }

    /// The current vertical scroll offset.
    #[must_use]
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }
}

impl ViewHost for SimHost {
    type Target = u32;
    type Root = u8;

    fn target_bounds(&self, target: u32, _root: u8) -> Option<Rect> {
        self.bounds.get(&target).copied()
    }

    fn root_window(&self, _root: u8) -> Rect {
        Rect::new(
            0.0,
            self.scroll_y,
            self.viewport_width,
            self.scroll_y + self.viewport_height,
        )
    }
}
