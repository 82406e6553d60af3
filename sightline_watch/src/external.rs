// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An engine fed by an external intersection primitive.

use core::fmt::{self, Debug};
use core::hash::Hash;

use hashbrown::HashMap;
use sightline_index::ratio_meets;

use crate::engine::{Engine, ObserveError};
use crate::registry::{Record, Registry};
use crate::watcher::{Visibility, Watcher, WatcherId, WatcherOptions};

/// An engine driven by pushed visibility ratios.
///
/// Where the host environment already has a native intersection primitive,
/// there is no index to maintain: the host forwards each observation it
/// receives as [`ReportEngine::report`], and this engine applies the same
/// registry discipline as the scan engine: threshold test with an
/// inclusive boundary, the two-state machine, enter delays with
/// cancellation, timestamps. The two engines are interchangeable through
/// [`Engine`].
///
/// [`WatcherFlags::POLLING`](crate::WatcherFlags::POLLING) has no meaning
/// here and is ignored: the primitive pushes fresh observations on its
/// own.
pub struct ReportEngine<K, R> {
    registry: Registry<K, R>,
    watched: HashMap<K, WatcherId>,
}

impl<K: Copy + Eq + Hash + Debug, R: Copy + Eq + Hash + Debug> ReportEngine<K, R> {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            watched: HashMap::new(),
        }
    }

    /// Read-only view of a watcher's record.
    #[must_use]
    pub fn watcher(&self, id: WatcherId) -> Option<&Watcher<K, R>> {
        self.registry.get(id)
    }

    /// Number of registered watchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.watched.len()
    }

    /// Returns `true` if no watcher is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Applies one pushed observation: `target` is visible with the given
    /// coverage `ratio`. Returns `false` for unwatched targets.
    ///
    /// Delayed enters that came due before `now` are delivered first, so a
    /// report that takes a target out of view after its dwell time elapsed
    /// reads as enter-then-leave, not as a canceled enter.
    pub fn report(&mut self, target: K, ratio: f64, now: u64) -> bool {
        self.registry.run_due(now);
        let Some(&id) = self.watched.get(&target) else {
            return false;
        };
        let Some(w) = self.registry.get(id) else {
            return false;
        };
        let visible = ratio_meets(ratio, w.threshold());
        self.registry.apply(id, visible, now);
        true
    }

    /// Delivers delayed enters whose dwell time has elapsed.
    pub fn tick(&mut self, now: u64) {
        self.registry.run_due(now);
    }

    /// The earliest pending delivery deadline, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.registry.next_due()
    }
}

impl<K: Copy + Eq + Hash + Debug, R: Copy + Eq + Hash + Debug> Default for ReportEngine<K, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash + Debug, R: Copy + Eq + Hash + Debug> Engine<K, R>
    for ReportEngine<K, R>
{
    fn observe(
        &mut self,
        target: K,
        options: WatcherOptions<K, R>,
        _now: u64,
    ) -> Result<WatcherId, ObserveError> {
        if self.watched.contains_key(&target) {
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
        self.watched.insert(target, id);
        Ok(id)
    }

    fn unwatch(&mut self, id: WatcherId, _now: u64) {
        let Some(w) = self.registry.get(id) else {
            return;
        };
        let target = w.target();
        self.registry.remove(id);
        self.watched.remove(&target);
    }

    fn destroy(&mut self) {
        self.registry.clear();
        self.watched.clear();
    }
}

impl<K: Copy + Eq + Hash + Debug, R: Copy + Eq + Hash + Debug> Debug for ReportEngine<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportEngine")
            .field("watched", &self.watched.len())
            .field("next_due", &self.next_due())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::ReportEngine;
    use crate::engine::{Engine, ObserveError};
    use crate::watcher::WatcherOptions;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn options(log: &Log) -> WatcherOptions<u32, u8> {
        let enters = Rc::clone(log);
        let leaves = Rc::clone(log);
        WatcherOptions::new(0)
            .threshold(0.5)
            .on_enter(move |_w| enters.borrow_mut().push("enter"))
            .on_leave(move |_w| leaves.borrow_mut().push("leave"))
    }

    #[test]
    fn reports_drive_the_same_edge_discipline() {
        let log: Log = Log::default();
        let mut engine: ReportEngine<u32, u8> = ReportEngine::new();
        engine.observe(1, options(&log), 0).unwrap();

        assert!(engine.report(1, 0.4, 10));
        assert!(log.borrow().is_empty());

        // Inclusive boundary.
        engine.report(1, 0.5, 20);
        engine.report(1, 0.8, 30);
        engine.report(1, 0.1, 40);
        assert_eq!(log.borrow().as_slice(), &["enter", "leave"]);

        // Unwatched targets are ignored.
        assert!(!engine.report(9, 1.0, 50));
    }

    #[test]
    fn delays_apply_to_pushed_observations_too() {
        let log: Log = Log::default();
        let mut engine: ReportEngine<u32, u8> = ReportEngine::new();
        engine.observe(1, options(&log).delay(200), 0).unwrap();

        engine.report(1, 1.0, 0);
        assert_eq!(engine.next_due(), Some(200));

        // Gone before the dwell time: nothing observable happened.
        engine.report(1, 0.0, 100);
        engine.tick(1_000);
        assert!(log.borrow().is_empty());

        // A full dwell delivers.
        engine.report(1, 1.0, 1_100);
        engine.tick(1_300);
        assert_eq!(log.borrow().as_slice(), &["enter"]);
    }

    #[test]
    fn elapsed_dwell_delivers_before_a_late_leave_report() {
        let log: Log = Log::default();
        let mut engine: ReportEngine<u32, u8> = ReportEngine::new();
        engine.observe(1, options(&log).delay(200), 0).unwrap();

        // Due at 200; the out-of-view report only arrives at 250.
        engine.report(1, 1.0, 0);
        engine.report(1, 0.0, 250);
        assert_eq!(log.borrow().as_slice(), &["enter", "leave"]);
    }

    #[test]
    fn duplicate_targets_are_rejected() {
        let log: Log = Log::default();
        let mut engine: ReportEngine<u32, u8> = ReportEngine::new();
        let id = engine.observe(1, options(&log), 0).unwrap();
        assert_eq!(
            engine.observe(1, options(&log), 0).unwrap_err(),
            ObserveError::AlreadyObserved
        );

        engine.unwatch(id, 10);
        engine.unwatch(id, 20);
        assert!(engine.is_empty());
        assert!(engine.observe(1, options(&log), 30).is_ok());
    }
}
