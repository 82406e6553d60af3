// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Watch: viewport intersection watchers for host-driven UIs.
//!
//! This crate tells registered observers when an element becomes visible
//! (or stops being visible) inside a scrollable region, without relying on
//! a single native primitive. Two interchangeable engines implement the
//! same [`Engine`] contract:
//!
//! - [`ScanEngine`]: keeps watched rectangles in a
//!   [`sightline_index::PositionIndex`], two sorted projections rebuilt on
//!   mutation signals (debounced) and re-scanned on scroll signals
//!   (throttled) with binary-search interval queries. Watchers that opt
//!   into [`WatcherFlags::POLLING`] are instead re-checked wholesale on a
//!   fixed interval, for visibility conditions no scroll or mutation
//!   signal can see.
//! - [`ReportEngine`]: applies the same edge discipline to visibility
//!   ratios pushed by a native intersection primitive the host already
//!   has.
//!
//! Both dispatch through one registry, so the enter/leave guarantees are
//! identical everywhere: a watcher's callbacks strictly alternate (no
//! double enter, no double leave), an enter [`delay`](WatcherOptions::delay)
//! is canceled without trace if the target leaves early, and within one
//! pass every leave fires before any enter.
//!
//! ## Hosts drive everything
//!
//! The engines are `no_std` state machines. A host implements [`ViewHost`]
//! (bounds and windows in root content space; see [`content_bounds`] for
//! the conversion from window-relative measurements), forwards its change
//! signals (`notify_mutation`, `notify_scroll`, `notify_resize`), passes
//! millisecond timestamps into every call, and calls
//! [`ScanEngine::tick`] when [`ScanEngine::next_due`] says something is
//! pending.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Rect;
//! use sightline_watch::{Engine, ScanEngine, ViewHost, WatcherOptions};
//!
//! // A one-root host: three rows of content, a 100px-tall window.
//! struct List {
//!     window: Rect,
//! }
//!
//! impl ViewHost for List {
//!     type Target = u32;
//!     type Root = u8;
//!
//!     fn target_bounds(&self, target: u32, _root: u8) -> Option<Rect> {
//!         let top = f64::from(target) * 120.0;
//!         Some(Rect::new(0.0, top, 100.0, top + 100.0))
//!     }
//!
//!     fn root_window(&self, _root: u8) -> Rect {
//!         self.window
//!     }
//! }
//!
//! let mut host = List {
//!     window: Rect::new(0.0, 0.0, 100.0, 100.0),
//! };
//! let mut engine: ScanEngine<List> = ScanEngine::new();
//!
//! // Watch row 2 for half-visibility.
//! let id = engine
//!     .observe(2, WatcherOptions::new(0).threshold(0.5), 0)
//!     .unwrap();
//!
//! // The first index rebuild is debounced; run it.
//! engine.tick(&host, 100);
//!
//! // Scroll row 2 into view and signal it.
//! host.window = Rect::new(0.0, 200.0, 100.0, 300.0);
//! engine.notify_scroll(&host, Some(0), 150);
//! assert_eq!(
//!     engine.watcher(id).unwrap().visibility(),
//!     sightline_watch::Visibility::In
//! );
//!
//! engine.unwatch(id, 200);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod engine;
mod external;
mod geometry;
mod registry;
mod watcher;

pub use engine::{
    Engine, ObserveError, POLL_INTERVAL_MS, REBUILD_DEBOUNCE_MS, SCAN_THROTTLE_MS, ScanEngine,
};
pub use external::ReportEngine;
pub use geometry::{ViewHost, content_bounds, content_window};
pub use sightline_index::CoverageMode;
pub use watcher::{
    EdgeHandler, Root, Visibility, VisibilityEdge, Watcher, WatcherFlags, WatcherId,
    WatcherOptions, step,
};
