// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Index: viewport scans over sorted rectangle projections.
//!
//! This crate is the geometric core of the Sightline watchers. It keeps a
//! [`PositionIndex`]: every watched rectangle (in its root's scrolled
//! content space) stored twice, sorted by top edge and by left edge. A scan
//! binary-searches both projections for the sub-range that intersects the
//! current viewport window, intersects the two candidate slices, and diffs
//! the result against the previous scan's **intersection window** to
//! produce enter/leave edges: each key reported at most once per scan,
//! leaves before enters.
//!
//! The index is generic over a small `Copy` key `K`; higher layers map keys
//! to their watcher records. Geometry is [`kurbo::Rect`]; whether a
//! rectangle is "in view" is decided by the caller-supplied probe, usually
//! built from [`in_view`] with a per-watcher threshold and [`CoverageMode`].
//!
//! # Example
//!
//! ```rust
//! use kurbo::Rect;
//! use sightline_index::{CoverageMode, Position, PositionIndex, in_view};
//!
//! let mut index: PositionIndex<u32> = PositionIndex::new();
//! index.rebuild((0..10).map(|i| Position {
//!     key: i,
//!     rect: Rect::new(0.0, f64::from(i) * 100.0, 80.0, f64::from(i) * 100.0 + 80.0),
//! }));
//!
//! // A 300px-tall window scrolled to the top of the content.
//! let window = Rect::new(0.0, 0.0, 100.0, 300.0);
//! let edges = index.scan(
//!     |pos| (in_view(pos.rect, window, 0.5, CoverageMode::Area), window),
//!     |_| false,
//! );
//! assert!(edges.outs.is_empty());
//! assert_eq!(edges.ins.as_slice(), &[0, 1, 2]);
//! ```
//!
//! Rebuilding the index resets the window and marks the next scan as a
//! full reconcile: it reports a leave edge for every indexed key that is
//! no longer in view, not only for keys the (now reset) window remembers.
//! Callers that keep their own per-key state machines can therefore treat
//! edge streams as eventually consistent across rebuilds.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cover;
mod index;
mod scan;

pub use cover::{CoverageMode, coverage, in_view, ratio_meets};
pub use index::{Position, PositionIndex};
pub use scan::Edges;
