// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Watcher records: identifiers, options, and the visibility state machine.

use alloc::boxed::Box;
use core::fmt::{self, Debug};

use kurbo::Rect;
use sightline_index::CoverageMode;

/// Generational handle for a registered watcher.
///
/// Doubles as the cancellation scope for the watcher's delayed work: every
/// deadline an engine records on behalf of a watcher is keyed by its id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WatcherId(u32, u32);

impl WatcherId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Watcher ids are intentionally 32-bit; higher bits are truncated by design."
    )]
    pub(crate) const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Behavior flags for a watcher.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct WatcherFlags: u8 {
        /// Check this watcher on the polling lane instead of the geometric
        /// index. For targets whose visibility depends on something scroll
        /// and mutation signals cannot see.
        const POLLING   = 0b0000_0001;
        /// Scrolls of roots other than this watcher's own never
        /// re-evaluate it.
        const ONLY_ROOT = 0b0000_0010;
    }
}

/// The scrollable container a watcher is measured against.
///
/// A lazy root is resolved exactly once, at registration, into a plain
/// root handle; the resolver is never consulted again.
pub enum Root<R> {
    /// A root handle known up front.
    Fixed(R),
    /// A resolver invoked once at registration. Returning `None` fails the
    /// registration loudly.
    Lazy(Box<dyn FnOnce() -> Option<R>>),
}

impl<R> Root<R> {
    pub(crate) fn resolve(self) -> Option<R> {
        match self {
            Self::Fixed(root) => Some(root),
            Self::Lazy(resolve) => resolve(),
        }
    }
}

impl<R: Debug> Debug for Root<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(root) => f.debug_tuple("Fixed").field(root).finish(),
            Self::Lazy(_) => f.debug_tuple("Lazy").field(&"..").finish(),
        }
    }
}

/// Visibility state of a watcher. Edges are the only transitions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Not in view; an enter edge is expected next.
    #[default]
    Out,
    /// In view; a leave edge is expected next.
    In,
}

/// A visibility transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VisibilityEdge {
    /// The watcher's target came into view.
    Enter,
    /// The watcher's target went out of view.
    Leave,
}

/// Advances the visibility state machine by one observation.
///
/// Pure: feeding the current in-view verdict yields the next state and the
/// edge taken, if any. Repeating a verdict never produces an edge, which
/// is what makes redundant reports from rebuild reconciles and the polling
/// lane safe.
#[must_use]
pub fn step(state: Visibility, in_view: bool) -> (Visibility, Option<VisibilityEdge>) {
    match (state, in_view) {
        (Visibility::Out, true) => (Visibility::In, Some(VisibilityEdge::Enter)),
        (Visibility::In, false) => (Visibility::Out, Some(VisibilityEdge::Leave)),
        (state, _) => (state, None),
    }
}

/// Callback invoked with a read-only view of the watcher on an edge.
pub type EdgeHandler<K, R> = Box<dyn FnMut(&Watcher<K, R>)>;

/// Options accepted by [`Engine::observe`](crate::Engine::observe).
pub struct WatcherOptions<K, R> {
    pub(crate) root: Root<R>,
    pub(crate) threshold: f64,
    pub(crate) mode: CoverageMode,
    pub(crate) delay: u64,
    pub(crate) flags: WatcherFlags,
    pub(crate) on_enter: Option<EdgeHandler<K, R>>,
    pub(crate) on_leave: Option<EdgeHandler<K, R>>,
}

impl<K, R> WatcherOptions<K, R> {
    /// Options against a fixed root, with no threshold (any positive
    /// overlap counts), no delay, and no callbacks.
    #[must_use]
    pub fn new(root: R) -> Self {
        Self::with_root(Root::Fixed(root))
    }

    /// Options with an explicit [`Root`] variant.
    #[must_use]
    pub fn with_root(root: Root<R>) -> Self {
        Self {
            root,
            threshold: 0.0,
            mode: CoverageMode::Area,
            delay: 0,
            flags: WatcherFlags::empty(),
            on_enter: None,
            on_leave: None,
        }
    }

    /// Minimum coverage ratio, clamped into `[0, 1]` at registration.
    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// How coverage is measured. Defaults to [`CoverageMode::Area`].
    #[must_use]
    pub fn mode(mut self, mode: CoverageMode) -> Self {
        self.mode = mode;
        self
    }

    /// Minimum dwell time in milliseconds before the enter callback fires.
    #[must_use]
    pub fn delay(mut self, delay: u64) -> Self {
        self.delay = delay;
        self
    }

    /// Check this watcher on the polling lane.
    #[must_use]
    pub fn polling(mut self) -> Self {
        self.flags |= WatcherFlags::POLLING;
        self
    }

    /// Ignore scrolls of roots other than this watcher's own.
    #[must_use]
    pub fn only_root(mut self) -> Self {
        self.flags |= WatcherFlags::ONLY_ROOT;
        self
    }

    /// Callback for enter edges.
    #[must_use]
    pub fn on_enter(mut self, handler: impl FnMut(&Watcher<K, R>) + 'static) -> Self {
        self.on_enter = Some(Box::new(handler));
        self
    }

    /// Callback for leave edges.
    #[must_use]
    pub fn on_leave(mut self, handler: impl FnMut(&Watcher<K, R>) + 'static) -> Self {
        self.on_leave = Some(Box::new(handler));
        self
    }
}

impl<K, R: Debug> Debug for WatcherOptions<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherOptions")
            .field("root", &self.root)
            .field("threshold", &self.threshold)
            .field("mode", &self.mode)
            .field("delay", &self.delay)
            .field("flags", &self.flags)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .finish()
    }
}

/// One registered observation request. Passive data: engines mutate it,
/// callbacks and hosts only read it.
#[derive(Debug)]
pub struct Watcher<K, R> {
    pub(crate) id: WatcherId,
    pub(crate) target: K,
    pub(crate) root: R,
    pub(crate) threshold: f64,
    pub(crate) mode: CoverageMode,
    pub(crate) delay: u64,
    pub(crate) flags: WatcherFlags,
    pub(crate) state: Visibility,
    pub(crate) delivered: bool,
    pub(crate) time: u64,
    pub(crate) time_in: u64,
    pub(crate) time_out: u64,
}

impl<K: Copy, R: Copy> Watcher<K, R> {
    /// This watcher's id.
    #[must_use]
    pub fn id(&self) -> WatcherId {
        self.id
    }

    /// The observed target handle.
    #[must_use]
    pub fn target(&self) -> K {
        self.target
    }

    /// The resolved root handle.
    #[must_use]
    pub fn root(&self) -> R {
        self.root
    }

    /// The coverage threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The coverage mode.
    #[must_use]
    pub fn mode(&self) -> CoverageMode {
        self.mode
    }

    /// The enter delay in milliseconds.
    #[must_use]
    pub fn delay(&self) -> u64 {
        self.delay
    }

    /// The watcher's flags.
    #[must_use]
    pub fn flags(&self) -> WatcherFlags {
        self.flags
    }

    /// The current visibility state.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.state
    }

    /// Timestamp of the last edge, in host milliseconds.
    #[must_use]
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Timestamp of the last delivered enter callback.
    #[must_use]
    pub fn time_in(&self) -> u64 {
        self.time_in
    }

    /// Timestamp of the last delivered leave callback.
    #[must_use]
    pub fn time_out(&self) -> u64 {
        self.time_out
    }
}

/// A watcher's measurable geometry, if any: `None` while detached or
/// zero-area.
pub(crate) fn measurable(rect: Option<Rect>) -> Option<Rect> {
    rect.filter(|r| r.width() > 0.0 && r.height() > 0.0)
}
