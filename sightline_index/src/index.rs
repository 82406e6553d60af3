// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The position index: two sorted projections plus the intersection window.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;

/// One indexed rectangle: a key plus its bounds in root content space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position<K> {
    /// Caller-chosen key identifying the watched element.
    pub key: K,
    /// Bounds relative to the root's scrolled content origin, so the
    /// rectangle is stable under pure scrolling.
    pub rect: Rect,
}

/// Sorted projections of watched rectangles plus the set currently in view.
///
/// Both projections hold the same [`Position`] values: `by_top` ascending
/// by `rect.y0`, `by_left` ascending by `rect.x0`. They are only ever
/// rebuilt together, in one [`PositionIndex::rebuild`] pass; partial
/// updates are not supported. The **intersection window** (the keys in
/// view as of the last scan, in vertical order) persists between scans
/// and is what [`PositionIndex::scan`] diffs against.
#[derive(Clone, Debug, Default)]
pub struct PositionIndex<K: Copy + Eq + Hash + Debug> {
    pub(crate) by_top: Vec<Position<K>>,
    pub(crate) by_left: Vec<Position<K>>,
    pub(crate) window: Vec<K>,
    pub(crate) window_set: HashSet<K>,
    pub(crate) reconcile: bool,
    /// Per-scan probe memo; lives here to reuse its allocation.
    pub(crate) cache: HashMap<K, (bool, Rect)>,
}

impl<K: Copy + Eq + Hash + Debug> PositionIndex<K> {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_top: Vec::new(),
            by_left: Vec::new(),
            window: Vec::new(),
            window_set: HashSet::new(),
            reconcile: false,
            cache: HashMap::new(),
        }
    }

    /// Number of indexed positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_top.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_top.is_empty()
    }

    /// Keys currently in view, in the order the last scan reported them.
    #[must_use]
    pub fn window(&self) -> &[K] {
        &self.window
    }

    /// Returns `true` if the key was in view as of the last scan.
    #[must_use]
    pub fn is_in_view(&self, key: K) -> bool {
        self.window_set.contains(&key)
    }

    /// Replaces both projections with a fresh snapshot.
    ///
    /// Callers pass only measurable positions; zero-area rectangles must be
    /// filtered (and their state settled) before reaching the index. The
    /// intersection window is reset and the next scan runs as a full
    /// reconcile against every indexed key.
    pub fn rebuild(&mut self, positions: impl IntoIterator<Item = Position<K>>) {
        self.by_top.clear();
        self.by_top.extend(positions);
        debug_assert!(
            self.by_top
                .iter()
                .all(|p| p.rect.width() > 0.0 && p.rect.height() > 0.0),
            "zero-area positions must be excluded before rebuild"
        );
        self.by_top
            .sort_by(|a, b| a.rect.y0.total_cmp(&b.rect.y0));
        self.by_left.clear();
        self.by_left.extend(self.by_top.iter().copied());
        self.by_left
            .sort_by(|a, b| a.rect.x0.total_cmp(&b.rect.x0));

        self.window.clear();
        self.window_set.clear();
        self.reconcile = true;
    }

    /// Drops all positions and the intersection window.
    pub fn clear(&mut self) {
        self.by_top.clear();
        self.by_left.clear();
        self.window.clear();
        self.window_set.clear();
        self.reconcile = false;
        self.cache.clear();
    }
}
