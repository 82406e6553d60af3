// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine contract and the indexed scan engine.

use alloc::vec::Vec;
use core::fmt::{self, Debug};

use hashbrown::HashMap;
use kurbo::Rect;
use sightline_index::{Position, PositionIndex, in_view};
use sightline_schedule::{Debounce, Interval, Throttle};
use smallvec::SmallVec;

use crate::geometry::ViewHost;
use crate::registry::{Record, Registry};
use crate::watcher::{Visibility, Watcher, WatcherFlags, WatcherId, WatcherOptions, measurable};

/// Debounce window for index rebuilds, in milliseconds.
pub const REBUILD_DEBOUNCE_MS: u64 = 100;
/// Throttle interval for scroll-driven scans, in milliseconds.
pub const SCAN_THROTTLE_MS: u64 = 50;
/// Period of the polling lane, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 75;

/// Why a registration was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObserveError {
    /// The target already has a watcher on this engine; watchers are keyed
    /// by target identity.
    AlreadyObserved,
    /// A lazy root resolver returned nothing. The one loud error path: it
    /// represents a configuration mistake, not a transient condition.
    RootUnresolved,
}

impl fmt::Display for ObserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyObserved => write!(f, "target is already observed by this engine"),
            Self::RootUnresolved => write!(f, "lazy root resolver returned no root"),
        }
    }
}

impl core::error::Error for ObserveError {}

/// The observation contract shared by the concrete engines.
///
/// [`ScanEngine`](crate::ScanEngine) and
/// [`ReportEngine`](crate::ReportEngine) expose the same registration
/// surface, so hosts can pick a detection strategy without touching call
/// sites.
pub trait Engine<K, R> {
    /// Registers a watcher for `target`. The root is resolved once, the
    /// threshold clamped into `[0, 1]`.
    fn observe(
        &mut self,
        target: K,
        options: WatcherOptions<K, R>,
        now: u64,
    ) -> Result<WatcherId, ObserveError>;

    /// Removes a watcher and cancels its outstanding delayed work.
    /// Idempotent: unknown or stale ids are ignored.
    fn unwatch(&mut self, id: WatcherId, now: u64);

    /// Cancels every deadline and drops every watcher. Safe to call
    /// repeatedly.
    fn destroy(&mut self);
}

/// Scope of a pending coalesced scroll scan.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ScrollScope<R> {
    /// Scrolls from more than one root were coalesced; no filtering.
    AnyRoot,
    /// Every coalesced scroll came from this root.
    Root(R),
}

/// The indexed scan engine.
///
/// Watchers without [`WatcherFlags::POLLING`] live in a
/// [`PositionIndex`]; mutation signals rebuild it (debounced), scroll
/// signals re-scan it (throttled), resize rebuilds immediately. Watchers
/// with the flag are re-checked wholesale on a fixed polling interval,
/// bypassing the index entirely.
///
/// The engine is host-driven: every entry point takes the current time in
/// milliseconds, and deferred work runs when the host calls
/// [`ScanEngine::tick`]. [`ScanEngine::next_due`] reports the earliest
/// pending deadline so hosts know when the next tick matters.
pub struct ScanEngine<H: ViewHost> {
    registry: Registry<H::Target, H::Root>,
    indexed: HashMap<H::Target, WatcherId>,
    polling: HashMap<H::Target, WatcherId>,
    positions: PositionIndex<WatcherId>,
    rebuild: Debounce,
    scan: Throttle,
    poll: Interval,
    pending_scroll: Option<ScrollScope<H::Root>>,
}

impl<H: ViewHost> ScanEngine<H> {
    /// Creates an engine with the default timing constants.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timing(REBUILD_DEBOUNCE_MS, SCAN_THROTTLE_MS, POLL_INTERVAL_MS)
    }

    /// Creates an engine with explicit debounce/throttle/poll timings.
    #[must_use]
    pub fn with_timing(rebuild_ms: u64, scan_ms: u64, poll_ms: u64) -> Self {
        Self {
            registry: Registry::new(),
            indexed: HashMap::new(),
            polling: HashMap::new(),
            positions: PositionIndex::new(),
            rebuild: Debounce::new(rebuild_ms),
            scan: Throttle::new(scan_ms),
            poll: Interval::new(poll_ms),
            pending_scroll: None,
        }
    }

    /// Read-only view of a watcher's record.
    #[must_use]
    pub fn watcher(&self, id: WatcherId) -> Option<&Watcher<H::Target, H::Root>> {
        self.registry.get(id)
    }

    /// Number of registered watchers on both lanes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexed.len() + self.polling.len()
    }

    /// Returns `true` if no watcher is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.polling.is_empty()
    }

    /// The earliest pending deadline across all lanes, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        [
            self.rebuild.next_due(),
            self.scan.next_due(),
            self.poll.next_due(),
            self.registry.next_due(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Signals that something in the watched subtree changed.
    ///
    /// Schedules the combined rebuild+scan under the debounce window;
    /// bursts collapse into one execution.
    pub fn notify_mutation(&mut self, now: u64) {
        self.rebuild.request(now);
    }

    /// Signals a viewport resize: rebuild and scan immediately, bypassing
    /// the debounce. Element sizes may have changed in ways no mutation
    /// signal reports.
    pub fn notify_resize(&mut self, host: &H, now: u64) {
        self.rebuild.cancel();
        self.check_viewport_from_scratch(host, now);
    }

    /// Signals that `scroll_root` scrolled (`None` when unknown).
    ///
    /// Scans only, since scrolling moves the window and not the indexed
    /// rectangles. The leading call scans immediately; calls inside the
    /// throttle interval coalesce into one trailing scan, and coalesced
    /// scrolls from different roots widen the scope so `ONLY_ROOT`
    /// filtering never starves a watcher.
    pub fn notify_scroll(&mut self, host: &H, scroll_root: Option<H::Root>, now: u64) {
        self.registry.run_due(now);
        if self.scan.request(now) {
            // A leading scan supersedes whatever a pending trailing scan
            // had accumulated.
            self.pending_scroll = None;
            self.check_viewport(host, scroll_root, now);
        } else {
            self.pending_scroll = Some(match (self.pending_scroll, scroll_root) {
                (None, Some(root)) => ScrollScope::Root(root),
                (Some(ScrollScope::Root(prev)), Some(root)) if prev == root => {
                    ScrollScope::Root(root)
                }
                _ => ScrollScope::AnyRoot,
            });
        }
    }

    /// Runs whatever is due at `now`: delayed enter deliveries, a
    /// debounced rebuild, a trailing scroll scan, and a polling pass.
    ///
    /// Due deliveries run first: a dwell time that elapsed before `now`
    /// came due before anything this tick observes, so a target that
    /// leaves in the same tick is reported as enter-then-leave rather
    /// than swallowed.
    pub fn tick(&mut self, host: &H, now: u64) {
        self.registry.run_due(now);
        if self.rebuild.fire(now) {
            self.rebuild_index(host, now);
            self.check_viewport(host, None, now);
        }
        if self.scan.fire(now) {
            let scroll_root = match self.pending_scroll.take() {
                Some(ScrollScope::Root(root)) => Some(root),
                _ => None,
            };
            self.check_viewport(host, scroll_root, now);
        }
        if self.poll.fire(now) {
            self.poll_pass(host, now);
        }
    }

    /// Rebuilds the index and scans, regardless of pending debounce state.
    pub fn check_viewport_from_scratch(&mut self, host: &H, now: u64) {
        self.registry.run_due(now);
        self.rebuild_index(host, now);
        self.check_viewport(host, None, now);
    }

    /// Scans the index against the current windows and dispatches edges,
    /// leaves before enters.
    pub fn check_viewport(&mut self, host: &H, scroll_root: Option<H::Root>, now: u64) {
        let mut windows: HashMap<H::Root, Rect> = HashMap::new();
        for &id in self.indexed.values() {
            if let Some(w) = self.registry.get(id) {
                windows
                    .entry(w.root())
                    .or_insert_with(|| host.root_window(w.root()));
            }
        }

        let Self {
            positions,
            registry,
            ..
        } = self;
        let edges = positions.scan(
            |pos| {
                let Some(w) = registry.get(pos.key) else {
                    return (false, Rect::ZERO);
                };
                let window = windows.get(&w.root()).copied().unwrap_or(Rect::ZERO);
                (in_view(pos.rect, window, w.threshold(), w.mode()), window)
            },
            |id| {
                scroll_root.is_some_and(|scrolled| {
                    registry.get(id).is_some_and(|w| {
                        w.flags().contains(WatcherFlags::ONLY_ROOT) && w.root() != scrolled
                    })
                })
            },
        );

        for id in edges.outs {
            self.registry.apply(id, false, now);
        }
        for id in edges.ins {
            self.registry.apply(id, true, now);
        }
    }

    /// Recomputes every indexed watcher's position and rebuilds both
    /// sorted projections.
    ///
    /// Targets that are detached or zero-area settle here: their delayed
    /// work is canceled and, if they were in view, they take their leave
    /// edge now. They stay registered and rejoin the index once geometry
    /// returns.
    fn rebuild_index(&mut self, host: &H, now: u64) {
        let mut fresh: Vec<Position<WatcherId>> = Vec::with_capacity(self.indexed.len());
        let mut unmeasurable: SmallVec<[WatcherId; 8]> = SmallVec::new();
        for (&target, &id) in &self.indexed {
            let Some(w) = self.registry.get(id) else {
                continue;
            };
            match measurable(host.target_bounds(target, w.root())) {
                Some(rect) => fresh.push(Position { key: id, rect }),
                None => unmeasurable.push(id),
            }
        }
        unmeasurable.sort_unstable_by_key(|id| id.idx());
        for id in unmeasurable {
            self.registry.cancel_delay(id);
            self.registry.apply(id, false, now);
        }
        self.positions.rebuild(fresh);
    }

    /// Checks every polling watcher directly against the host, leaves
    /// before enters.
    fn poll_pass(&mut self, host: &H, now: u64) {
        let mut checks: SmallVec<[(WatcherId, bool); 8]> = SmallVec::new();
        for (&target, &id) in &self.polling {
            let Some(w) = self.registry.get(id) else {
                continue;
            };
            let window = host.root_window(w.root());
            let visible = measurable(host.target_bounds(target, w.root()))
                .is_some_and(|rect| in_view(rect, window, w.threshold(), w.mode()));
            checks.push((id, visible));
        }
        checks.sort_unstable_by_key(|(id, _)| id.idx());
        for &(id, visible) in checks.iter().filter(|(_, visible)| !visible) {
            self.registry.apply(id, visible, now);
        }
        for &(id, visible) in checks.iter().filter(|(_, visible)| *visible) {
            self.registry.apply(id, visible, now);
        }
    }
}

impl<H: ViewHost> Default for ScanEngine<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ViewHost> Engine<H::Target, H::Root> for ScanEngine<H> {
    fn observe(
        &mut self,
        target: H::Target,
        options: WatcherOptions<H::Target, H::Root>,
        now: u64,
    ) -> Result<WatcherId, ObserveError> {
        if self.indexed.contains_key(&target) || self.polling.contains_key(&target) {
            return Err(ObserveError::AlreadyObserved);
        }
        let WatcherOptions {
            root,
            threshold,
            mode,
            delay,
            flags,
            on_enter,
            on_leave,
        } = options;
        let root = root.resolve().ok_or(ObserveError::RootUnresolved)?;
        let id = self.registry.insert(|id| Record {
            data: Watcher {
                id,
                target,
                root,
                threshold: threshold.clamp(0.0, 1.0),
                mode,
                delay,
                flags,
                state: Visibility::Out,
                delivered: false,
                time: 0,
                time_in: 0,
                time_out: 0,
            },
            on_enter,
            on_leave,
        });
        if flags.contains(WatcherFlags::POLLING) {
            self.polling.insert(target, id);
            self.poll.start(now);
        } else {
            self.indexed.insert(target, id);
            self.rebuild.request(now);
        }
        Ok(id)
    }

    fn unwatch(&mut self, id: WatcherId, now: u64) {
        let Some(w) = self.registry.get(id) else {
            return;
        };
        let target = w.target();
        let was_polling = w.flags().contains(WatcherFlags::POLLING);
        self.registry.remove(id);
        if was_polling {
            self.polling.remove(&target);
            if self.polling.is_empty() {
                self.poll.stop();
            }
        } else {
            self.indexed.remove(&target);
            // Removal leaves a stale entry in the projections; rebuilding
            // on the next tick is cheaper and safer than splicing both
            // arrays in place.
            self.rebuild.request(now);
        }
    }

    fn destroy(&mut self) {
        self.registry.clear();
        self.indexed.clear();
        self.polling.clear();
        self.positions.clear();
        self.rebuild.cancel();
        self.scan.reset();
        self.poll.stop();
        self.pending_scroll = None;
    }
}

impl<H: ViewHost> Debug for ScanEngine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanEngine")
            .field("indexed", &self.indexed.len())
            .field("polling", &self.polling.len())
            .field("positions", &self.positions.len())
            .field("next_due", &self.next_due())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use hashbrown::HashMap;
    use kurbo::Rect;

    use super::{Engine, ObserveError, ScanEngine};
    use crate::geometry::ViewHost;
    use crate::watcher::{Root, Visibility, WatcherOptions};

    /// A simulated scroll container: one root, targets laid out in
    /// content space, a movable window.
    struct ListHost {
        window: Rect,
        bounds: HashMap<u32, Rect>,
    }

    impl ListHost {
        fn new(window: Rect) -> Self {
            Self {
                window,
                bounds: HashMap::new(),
            }
        }

        fn place(&mut self, target: u32, rect: Rect) {
            self.bounds.insert(target, rect);
        }

        fn scroll_to(&mut self, y: f64) {
            let h = self.window.height();
            self.window = Rect::new(self.window.x0, y, self.window.x1, y + h);
        }
    }

    impl ViewHost for ListHost {
        type Target = u32;
        type Root = u8;

        fn target_bounds(&self, target: u32, _root: u8) -> Option<Rect> {
            self.bounds.get(&target).copied()
        }

        fn root_window(&self, _root: u8) -> Rect {
            self.window
        }
    }

    type Log = Rc<RefCell<Vec<(&'static str, u32)>>>;

    fn logging_options(log: &Log, target: u32) -> WatcherOptions<u32, u8> {
        let enters = Rc::clone(log);
        let leaves = Rc::clone(log);
        WatcherOptions::new(0)
            .on_enter(move |_w| enters.borrow_mut().push(("enter", target)))
            .on_leave(move |_w| leaves.borrow_mut().push(("leave", target)))
    }

    #[test]
    fn scenario_a_scrolling_into_view_fires_one_enter() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        // Fully below the initial viewport.
        host.place(1, Rect::new(0.0, 150.0, 100.0, 250.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        let id = engine
            .observe(1, logging_options(&log, 1).threshold(0.5), 0)
            .unwrap();
        assert_eq!(engine.next_due(), Some(100));
        engine.tick(&host, 100);
        assert!(log.borrow().is_empty());

        // 60% visible: the window covers 190..250 of the 100-tall target.
        host.scroll_to(190.0);
        engine.notify_scroll(&host, Some(0), 200);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1)]);
        assert_eq!(engine.watcher(id).unwrap().visibility(), Visibility::In);

        // Further scrolls that keep it visible fire nothing.
        host.scroll_to(160.0);
        engine.notify_scroll(&host, Some(0), 300);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn scenario_b_delay_swallows_a_short_visit() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        host.place(1, Rect::new(0.0, 0.0, 100.0, 80.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        engine
            .observe(1, logging_options(&log, 1).delay(200), 0)
            .unwrap();
        engine.tick(&host, 100);

        // Gone 100ms after entering, well inside the dwell time.
        host.scroll_to(500.0);
        engine.notify_scroll(&host, Some(0), 200);
        engine.tick(&host, 1_000);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn scenario_c_thresholds_fire_independently() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        // Two targets with identical geometry, fully below the viewport.
        host.place(1, Rect::new(0.0, 100.0, 100.0, 200.0));
        host.place(2, Rect::new(0.0, 100.0, 100.0, 200.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        engine
            .observe(1, logging_options(&log, 1).threshold(0.3), 0)
            .unwrap();
        engine
            .observe(2, logging_options(&log, 2).threshold(0.9), 0)
            .unwrap();
        engine.tick(&host, 100);
        assert!(log.borrow().is_empty());

        // 50% visible: only the 0.3-threshold watcher enters.
        host.scroll_to(50.0);
        engine.notify_scroll(&host, Some(0), 200);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1)]);

        // 95% visible: now the 0.9-threshold watcher enters too.
        host.scroll_to(95.0);
        engine.notify_scroll(&host, Some(0), 300);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1), ("enter", 2)]);
    }

    #[test]
    fn scenario_d_polling_detects_geometry_changes_without_signals() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        host.place(1, Rect::new(0.0, 500.0, 100.0, 560.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        engine
            .observe(1, logging_options(&log, 1).threshold(0.5).polling(), 0)
            .unwrap();

        // Nothing to do: no mutation or scroll signal ever arrives.
        engine.tick(&host, 75);
        assert!(log.borrow().is_empty());

        // The target is moved directly; the next poll tick sees it.
        host.place(1, Rect::new(0.0, 20.0, 100.0, 80.0));
        engine.tick(&host, 150);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1)]);

        // And sees it leave again.
        host.place(1, Rect::new(0.0, 500.0, 100.0, 560.0));
        engine.tick(&host, 225);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1), ("leave", 1)]);
    }

    #[test]
    fn edge_exclusivity_across_rebuilds() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        host.place(1, Rect::new(0.0, 0.0, 100.0, 80.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        engine.observe(1, logging_options(&log, 1), 0).unwrap();
        engine.tick(&host, 100);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1)]);

        // Mutations that do not change visibility produce no edges, even
        // though each rebuild resets the intersection window.
        engine.notify_mutation(150);
        engine.tick(&host, 250);
        engine.notify_mutation(300);
        engine.tick(&host, 400);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1)]);

        // The target detaches; the rebuild settles it with one leave.
        host.bounds.remove(&1);
        engine.notify_mutation(450);
        engine.tick(&host, 550);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1), ("leave", 1)]);
    }

    #[test]
    fn elapsed_dwell_delivers_before_a_same_call_leave() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        host.place(1, Rect::new(0.0, 0.0, 100.0, 80.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        engine
            .observe(1, logging_options(&log, 1).delay(200), 0)
            .unwrap();
        engine.tick(&host, 100);
        assert_eq!(engine.next_due(), Some(300));

        // The dwell time elapsed at 300; the scroll that removes the
        // target is only observed at 350. The due enter is delivered
        // first, then the leave, instead of canceling an enter that
        // already came due.
        host.scroll_to(500.0);
        engine.notify_scroll(&host, Some(0), 350);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1), ("leave", 1)]);
    }

    #[test]
    fn unwatch_is_idempotent_and_silences_callbacks() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        host.place(1, Rect::new(0.0, 0.0, 100.0, 80.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        let id = engine
            .observe(1, logging_options(&log, 1).delay(200), 0)
            .unwrap();
        engine.tick(&host, 100);

        engine.unwatch(id, 150);
        engine.unwatch(id, 160);
        assert!(engine.is_empty());

        // The pending delayed enter died with the watcher.
        engine.tick(&host, 1_000);
        assert!(log.borrow().is_empty());

        // The target can be observed again afterwards.
        assert!(engine.observe(1, logging_options(&log, 1), 1_100).is_ok());
    }

    #[test]
    fn duplicate_targets_and_lazy_roots_are_policed() {
        let log: Log = Log::default();
        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        engine.observe(1, logging_options(&log, 1), 0).unwrap();
        assert_eq!(
            engine.observe(1, logging_options(&log, 1), 0).unwrap_err(),
            ObserveError::AlreadyObserved
        );

        let lazy = WatcherOptions::with_root(Root::Lazy(alloc::boxed::Box::new(|| None)));
        assert_eq!(
            engine.observe(2, lazy, 0).unwrap_err(),
            ObserveError::RootUnresolved
        );

        // A lazy root that resolves registers normally.
        let lazy = WatcherOptions::with_root(Root::Lazy(alloc::boxed::Box::new(|| Some(0))));
        assert!(engine.observe(3, lazy, 0).is_ok());
    }

    #[test]
    fn only_root_watchers_ignore_foreign_scrolls() {
        struct TwoRoots {
            windows: [Rect; 2],
            bounds: HashMap<u32, (u8, Rect)>,
        }

        impl ViewHost for TwoRoots {
            type Target = u32;
            type Root = u8;

            fn target_bounds(&self, target: u32, root: u8) -> Option<Rect> {
                self.bounds
                    .get(&target)
                    .filter(|(r, _)| *r == root)
                    .map(|(_, rect)| *rect)
            }

            fn root_window(&self, root: u8) -> Rect {
                self.windows[usize::from(root)]
            }
        }

        let log: Log = Log::default();
        let mut host = TwoRoots {
            windows: [
                Rect::new(0.0, 0.0, 100.0, 100.0),
                Rect::new(0.0, 0.0, 100.0, 100.0),
            ],
            bounds: HashMap::new(),
        };
        host.bounds.insert(1, (1, Rect::new(0.0, 20.0, 100.0, 80.0)));

        let mut engine: ScanEngine<TwoRoots> = ScanEngine::new();
        let enters = Rc::clone(&log);
        let options: WatcherOptions<u32, u8> = WatcherOptions::new(1)
            .only_root()
            .on_enter(move |_w| enters.borrow_mut().push(("enter", 1)));
        engine.observe(1, options, 0).unwrap();
        engine.tick(&host, 100);
        assert_eq!(log.borrow().len(), 1);

        // Root 1's window scrolls away, but the signal names root 0: the
        // watcher's membership is frozen and no leave fires.
        host.windows[1] = Rect::new(0.0, 500.0, 100.0, 600.0);
        engine.notify_scroll(&host, Some(0), 200);
        assert_eq!(engine.positions.window().len(), 1);

        // A scroll attributed to its own root delivers the leave.
        engine.notify_scroll(&host, Some(1), 300);
        assert_eq!(engine.positions.window().len(), 0);
    }

    #[test]
    fn throttled_scrolls_coalesce_into_one_trailing_scan() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        host.place(1, Rect::new(0.0, 150.0, 100.0, 250.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        engine
            .observe(1, logging_options(&log, 1).threshold(0.5), 0)
            .unwrap();
        engine.tick(&host, 100);

        // A burst of scrolls: the first scans immediately (nothing
        // visible yet), the rest coalesce.
        engine.notify_scroll(&host, Some(0), 110);
        host.scroll_to(60.0);
        engine.notify_scroll(&host, Some(0), 120);
        host.scroll_to(150.0);
        engine.notify_scroll(&host, Some(0), 140);
        assert!(log.borrow().is_empty());
        assert_eq!(engine.next_due(), Some(160));

        // The trailing scan sees the final scroll position.
        engine.tick(&host, 160);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1)]);
    }

    #[test]
    fn resize_rebuilds_immediately_without_waiting_for_the_debounce() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        host.place(1, Rect::new(0.0, 150.0, 100.0, 250.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        engine
            .observe(1, logging_options(&log, 1).threshold(0.5), 0)
            .unwrap();
        engine.tick(&host, 100);
        assert!(log.borrow().is_empty());

        // A viewport resize reflows the target into view; no mutation
        // signal arrives, and the pending debounce is discarded.
        host.place(1, Rect::new(0.0, 20.0, 100.0, 90.0));
        engine.notify_mutation(110);
        engine.notify_resize(&host, 120);
        assert_eq!(log.borrow().as_slice(), &[("enter", 1)]);
        assert_eq!(engine.next_due(), None);
    }

    #[test]
    fn destroy_cancels_everything_and_is_reentrant() {
        let log: Log = Log::default();
        let mut host = ListHost::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        host.place(1, Rect::new(0.0, 0.0, 100.0, 80.0));

        let mut engine: ScanEngine<ListHost> = ScanEngine::new();
        engine
            .observe(1, logging_options(&log, 1).delay(300), 0)
            .unwrap();
        engine.tick(&host, 100);

        engine.destroy();
        engine.destroy();
        assert!(engine.is_empty());
        assert_eq!(engine.next_due(), None);
        engine.tick(&host, 10_000);
        assert!(log.borrow().is_empty());
    }
}
