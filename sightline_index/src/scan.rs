// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport scans: bracketed binary search, candidate intersection, diffing.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;
use smallvec::SmallVec;

use crate::index::{Position, PositionIndex};

/// Enter/leave edges produced by one scan, leaves first.
///
/// Within each list, keys appear in vertical (top-edge) order. A key
/// appears at most once per scan, and never in both lists.
#[derive(Clone, Debug)]
pub struct Edges<K> {
    /// Keys that left the intersection window this scan.
    pub outs: SmallVec<[K; 8]>,
    /// Keys that entered the intersection window this scan.
    pub ins: SmallVec<[K; 8]>,
}

impl<K> Edges<K> {
    /// Returns `true` if the scan produced no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outs.is_empty() && self.ins.is_empty()
    }
}

impl<K> Default for Edges<K> {
    fn default() -> Self {
        Self {
            outs: SmallVec::new(),
            ins: SmallVec::new(),
        }
    }
}

/// The sort axis of the projection being searched.
#[derive(Copy, Clone, Debug)]
enum Axis {
    Y,
    X,
}

impl Axis {
    fn span(self, rect: &Rect) -> (f64, f64) {
        match self {
            Self::Y => (rect.y0, rect.y1),
            Self::X => (rect.x0, rect.x1),
        }
    }
}

/// Where a probed position sits relative to the window on the sort axis.
#[derive(Copy, Clone, Debug)]
enum Class {
    /// Spans overlap: the position could intersect the viewport.
    Overlap,
    /// Entirely before the window on this axis.
    Before,
    /// Entirely past the window on this axis.
    After,
}

fn classify(rect: &Rect, window: &Rect, axis: Axis) -> Class {
    let (a0, a1) = axis.span(rect);
    let (w0, w1) = axis.span(window);
    if a0 > w1 {
        Class::After
    } else if a1 < w0 {
        Class::Before
    } else {
        Class::Overlap
    }
}

/// Evaluates a position once per scan: the in-view verdict plus the window
/// it was judged against (needed for axis classification under
/// per-watcher roots).
fn evaluate<K, F>(
    cache: &mut HashMap<K, (bool, Rect)>,
    probe: &mut F,
    pos: &Position<K>,
) -> (bool, Rect)
where
    K: Copy + Eq + Hash + Debug,
    F: FnMut(&Position<K>) -> (bool, Rect),
{
    if let Some(hit) = cache.get(&pos.key) {
        return *hit;
    }
    let fresh = probe(pos);
    cache.insert(pos.key, fresh);
    fresh
}

/// Binary-searches a sorted projection for one end of the overlap range.
///
/// `start = true` seeks the first overlapping index, `start = false` the
/// last. Each step halves the bracket using the midpoint's position
/// relative to its window on the sort axis, and `res` tracks the best
/// overlapping index seen so far, so a locally surprising reading cannot
/// discard an already-found band. With positions sorted by their start
/// coordinate and extents that do not interleave (the layouts scrollable
/// content produces), the overlap range is contiguous and the result is
/// exact; interleaved extents may be bracketed short and self-correct on
/// a later pass.
fn search_edge<K, F>(
    positions: &[Position<K>],
    axis: Axis,
    start: bool,
    cache: &mut HashMap<K, (bool, Rect)>,
    probe: &mut F,
) -> Option<usize>
where
    K: Copy + Eq + Hash + Debug,
    F: FnMut(&Position<K>) -> (bool, Rect),
{
    let len = positions.len();
    if len == 0 {
        return None;
    }
    if len == 1 {
        // Degenerate arrays are not divided.
        let (_, window) = evaluate(cache, probe, &positions[0]);
        return match classify(&positions[0].rect, &window, axis) {
            Class::Overlap => Some(0),
            _ => None,
        };
    }

    let mut from = 0_usize;
    let mut to = len;
    let mut res = None;
    while from < to {
        let mid = from + (to - from) / 2;
        let (_, window) = evaluate(cache, probe, &positions[mid]);
        match classify(&positions[mid].rect, &window, axis) {
            Class::Overlap => {
                res = Some(mid);
                if start {
                    to = mid;
                } else {
                    from = mid + 1;
                }
            }
            Class::After => to = mid,
            Class::Before => from = mid + 1,
        }
    }
    res
}

impl<K: Copy + Eq + Hash + Debug> PositionIndex<K> {
    /// Scans the index against the current viewport and diffs the result
    /// into enter/leave edges.
    ///
    /// `probe` evaluates one position: whether it meets its watcher's
    /// threshold, and the window rectangle of that watcher's root (in the
    /// same content space as the position). It is called at most once per
    /// key per scan; the verdict is memoized because both projections may
    /// probe the same key.
    ///
    /// `carry` marks keys whose membership is frozen this scan (scroll
    /// filtering): a carried key keeps its previous in/out state and takes
    /// no edge.
    ///
    /// The first scan after [`PositionIndex::rebuild`] reconciles against
    /// every indexed key: leave edges are reported for all keys not in the
    /// new set, not only for keys the reset window remembers. Callers with
    /// per-key state machines deduplicate the redundant ones.
    pub fn scan<F, C>(&mut self, mut probe: F, carry: C) -> Edges<K>
    where
        F: FnMut(&Position<K>) -> (bool, Rect),
        C: Fn(K) -> bool,
    {
        self.cache.clear();

        let mut new_vec: Vec<K> = Vec::new();
        let mut new_set: HashSet<K> = HashSet::new();

        if !self.by_top.is_empty() {
            let y_lo = search_edge(&self.by_top, Axis::Y, true, &mut self.cache, &mut probe);
            let y_hi = search_edge(&self.by_top, Axis::Y, false, &mut self.cache, &mut probe);
            let x_lo = search_edge(&self.by_left, Axis::X, true, &mut self.cache, &mut probe);
            let x_hi = search_edge(&self.by_left, Axis::X, false, &mut self.cache, &mut probe);

            if let (Some(y_lo), Some(y_hi), Some(x_lo), Some(x_hi)) = (y_lo, y_hi, x_lo, x_hi)
                && y_lo <= y_hi
                && x_lo <= x_hi
            {
                // The slice intersection is the set of positions whose
                // rectangles intersect their windows on both axes; the
                // memoized in-view verdict then applies each watcher's
                // threshold.
                let horizontal: HashSet<K> =
                    self.by_left[x_lo..=x_hi].iter().map(|p| p.key).collect();
                for i in y_lo..=y_hi {
                    let pos = self.by_top[i];
                    if !horizontal.contains(&pos.key) {
                        continue;
                    }
                    let (in_view, _) = evaluate(&mut self.cache, &mut probe, &pos);
                    if !in_view || carry(pos.key) {
                        continue;
                    }
                    if new_set.insert(pos.key) {
                        new_vec.push(pos.key);
                    }
                }
            }
        }

        // Carried keys that were in view stay in view.
        for &k in &self.window {
            if carry(k) && new_set.insert(k) {
                new_vec.push(k);
            }
        }

        let mut edges = Edges::default();
        if self.reconcile {
            for p in &self.by_top {
                if !new_set.contains(&p.key) {
                    edges.outs.push(p.key);
                }
            }
            self.reconcile = false;
        } else {
            for &k in &self.window {
                if !new_set.contains(&k) {
                    edges.outs.push(k);
                }
            }
        }
        for &k in &new_vec {
            if !self.window_set.contains(&k) {
                edges.ins.push(k);
            }
        }

        self.window = new_vec;
        self.window_set = new_set;
        edges
    }
}
