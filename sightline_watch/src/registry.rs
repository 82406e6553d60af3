// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The watcher arena and the shared edge-dispatch discipline.
//!
//! Both engines store their watchers here. The registry owns the records,
//! the per-watcher delayed-enter deadlines, and the one place visibility
//! transitions are applied, so the indexed, polling, and report paths all
//! share identical timing behavior.

use alloc::vec::Vec;
use core::fmt::{self, Debug};

use sightline_schedule::TaskQueue;

use crate::watcher::{EdgeHandler, Visibility, VisibilityEdge, Watcher, WatcherId, step};

pub(crate) struct Record<K, R> {
    pub(crate) data: Watcher<K, R>,
    pub(crate) on_enter: Option<EdgeHandler<K, R>>,
    pub(crate) on_leave: Option<EdgeHandler<K, R>>,
}

/// Arena of watcher records with generational ids and delayed dispatch.
pub(crate) struct Registry<K, R> {
    entries: Vec<Option<Record<K, R>>>,
    generations: Vec<u32>,
    free: Vec<usize>,
    delays: TaskQueue<WatcherId>,
}

impl<K: Copy, R: Copy> Registry<K, R> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            delays: TaskQueue::new(),
        }
    }

    /// Inserts a record built from its freshly assigned id.
    pub(crate) fn insert(&mut self, make: impl FnOnce(WatcherId) -> Record<K, R>) -> WatcherId {
        let idx = self.free.pop().unwrap_or_else(|| {
            self.entries.push(None);
            self.generations.push(1);
            self.entries.len() - 1
        });
        let id = WatcherId::new(idx, self.generations[idx]);
        self.entries[idx] = Some(make(id));
        id
    }

    fn slot(&self, id: WatcherId) -> Option<usize> {
        let idx = id.idx();
        (self.generations.get(idx) == Some(&id.generation())).then_some(idx)
    }

    pub(crate) fn get(&self, id: WatcherId) -> Option<&Watcher<K, R>> {
        let idx = self.slot(id)?;
        self.entries[idx].as_ref().map(|r| &r.data)
    }

    /// Removes the record and cancels its pending delayed work. Returns
    /// `false` if the id was already gone, which makes removal idempotent.
    pub(crate) fn remove(&mut self, id: WatcherId) -> bool {
        let Some(idx) = self.slot(id) else {
            return false;
        };
        if self.entries[idx].take().is_none() {
            return false;
        }
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free.push(idx);
        self.delays.cancel(id);
        true
    }

    /// Applies one in-view observation to the watcher's state machine and
    /// dispatches whatever the resulting edge requires.
    ///
    /// Enter with a delay schedules delivery at `now + delay` under the
    /// watcher's id (join: re-entering replaces the pending deadline);
    /// enter without a delay delivers immediately. Leave always cancels a
    /// pending delivery and delivers `on_leave` only if the enter callback
    /// had actually run; a watcher that never finished entering leaves
    /// without any observable effect.
    pub(crate) fn apply(&mut self, id: WatcherId, in_view: bool, now: u64) {
        let Some(idx) = self.slot(id) else {
            return;
        };
        let Self {
            entries, delays, ..
        } = self;
        let Some(rec) = entries[idx].as_mut() else {
            return;
        };

        let (state, edge) = step(rec.data.state, in_view);
        rec.data.state = state;
        match edge {
            Some(VisibilityEdge::Enter) => {
                rec.data.time = now;
                if rec.data.delay > 0 {
                    delays.schedule(id, now + rec.data.delay, true);
                } else {
                    deliver_enter(rec, now);
                }
            }
            Some(VisibilityEdge::Leave) => {
                rec.data.time = now;
                delays.cancel(id);
                if rec.data.delivered {
                    deliver_leave(rec, now);
                }
            }
            None => {}
        }
    }

    /// Cancels the watcher's pending delayed delivery, if any.
    pub(crate) fn cancel_delay(&mut self, id: WatcherId) {
        self.delays.cancel(id);
    }

    /// Delivers every delayed enter whose dwell time has elapsed.
    pub(crate) fn run_due(&mut self, now: u64) {
        for id in self.delays.drain_due(now) {
            let Some(idx) = self.slot(id) else {
                continue;
            };
            let Some(rec) = self.entries[idx].as_mut() else {
                continue;
            };
            debug_assert!(
                rec.data.state == Visibility::In,
                "a pending delivery implies the watcher is still in view"
            );
            if rec.data.state == Visibility::In && !rec.data.delivered {
                deliver_enter(rec, now);
            }
        }
    }

    /// Earliest pending delivery deadline.
    pub(crate) fn next_due(&self) -> Option<u64> {
        self.delays.next_due()
    }

    /// Drops every record and deadline.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.generations.clear();
        self.free.clear();
        self.delays.clear();
    }
}

fn deliver_enter<K, R>(rec: &mut Record<K, R>, now: u64) {
    rec.data.delivered = true;
    rec.data.time_in = now;
    let Record { data, on_enter, .. } = rec;
    if let Some(handler) = on_enter {
        handler(data);
    }
}

fn deliver_leave<K, R>(rec: &mut Record<K, R>, now: u64) {
    rec.data.delivered = false;
    rec.data.time_out = now;
    let Record { data, on_leave, .. } = rec;
    if let Some(handler) = on_leave {
        handler(data);
    }
}

impl<K: Debug + Copy, R: Debug + Copy> Debug for Registry<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &(self.entries.len() - self.free.len()))
            .field("pending_delays", &self.delays.len())
            .finish()
    }
}
