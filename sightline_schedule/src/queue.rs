// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group-keyed pending deadlines with join and cancel semantics.

use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

#[derive(Copy, Clone, Debug)]
struct Deadline {
    due: u64,
    seq: u64,
}

/// Pending deadlines keyed by group.
///
/// A group holds at most one deadline at a time. Scheduling an occupied
/// group either replaces the pending deadline (`join = true`) or leaves it
/// untouched (`join = false`). Draining removes and returns every group
/// whose deadline has passed, ordered by deadline and then by scheduling
/// order, so repeated drains with the same inputs yield the same sequence.
#[derive(Clone, Debug, Default)]
pub struct TaskQueue<G: Copy + Eq + Hash + Debug> {
    pending: HashMap<G, Deadline>,
    seq: u64,
}

impl<G: Copy + Eq + Hash + Debug> TaskQueue<G> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            seq: 0,
        }
    }

    /// Number of pending groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no group is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns `true` if the group has a pending deadline.
    #[must_use]
    pub fn contains(&self, group: G) -> bool {
        self.pending.contains_key(&group)
    }

    /// Returns the pending deadline of the group, if any.
    #[must_use]
    pub fn due_of(&self, group: G) -> Option<u64> {
        self.pending.get(&group).map(|d| d.due)
    }

    /// Schedules `group` to come due at `due`.
    ///
    /// If the group is already pending, `join = true` replaces its deadline
    /// (the usual cancel-and-replace discipline for delayed work) while
    /// `join = false` keeps the existing one and ignores this request.
    pub fn schedule(&mut self, group: G, due: u64, join: bool) {
        if !join && self.pending.contains_key(&group) {
            return;
        }
        self.seq += 1;
        self.pending.insert(
            group,
            Deadline {
                due,
                seq: self.seq,
            },
        );
    }

    /// Cancels the group's pending deadline. Returns `true` if one existed.
    pub fn cancel(&mut self, group: G) -> bool {
        self.pending.remove(&group).is_some()
    }

    /// Cancels every pending deadline.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// The earliest pending deadline, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.pending.values().map(|d| d.due).min()
    }

    /// Removes and returns every group due at or before `now`.
    ///
    /// The result is ordered by deadline, then by scheduling order. A group
    /// is never yielded twice for one scheduling.
    pub fn drain_due(&mut self, now: u64) -> SmallVec<[G; 8]> {
        let mut due: SmallVec<[(G, Deadline); 8]> = self
            .pending
            .iter()
            .filter(|(_, d)| d.due <= now)
            .map(|(g, d)| (*g, *d))
            .collect();
        due.sort_unstable_by_key(|(_, d)| (d.due, d.seq));
        let mut out = SmallVec::new();
        for (g, _) in due {
            self.pending.remove(&g);
            out.push(g);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::TaskQueue;

    #[test]
    fn schedule_and_drain_in_deadline_order() {
        let mut q: TaskQueue<u32> = TaskQueue::new();
        q.schedule(1, 300, true);
        q.schedule(2, 100, true);
        q.schedule(3, 200, true);

        assert_eq!(q.next_due(), Some(100));
        let due = q.drain_due(250);
        assert_eq!(due.as_slice(), &[2, 3]);
        assert_eq!(q.len(), 1);

        // Draining again does not yield the same groups twice.
        assert!(q.drain_due(250).is_empty());
        assert_eq!(q.drain_due(300).as_slice(), &[1]);
        assert!(q.is_empty());
    }

    #[test]
    fn join_replaces_pending_deadline() {
        let mut q: TaskQueue<u32> = TaskQueue::new();
        q.schedule(1, 100, true);
        q.schedule(1, 500, true);
        assert!(q.drain_due(100).is_empty());
        assert_eq!(q.due_of(1), Some(500));
        assert_eq!(q.drain_due(500).as_slice(), &[1]);
    }

    #[test]
    fn non_join_keeps_existing_deadline() {
        let mut q: TaskQueue<u32> = TaskQueue::new();
        q.schedule(1, 100, true);
        q.schedule(1, 500, false);
        assert_eq!(q.due_of(1), Some(100));
    }

    #[test]
    fn cancel_prevents_delivery() {
        let mut q: TaskQueue<u32> = TaskQueue::new();
        q.schedule(1, 100, true);
        assert!(q.cancel(1));
        assert!(!q.cancel(1));
        assert!(q.drain_due(1_000).is_empty());
    }

    #[test]
    fn equal_deadlines_drain_in_scheduling_order() {
        let mut q: TaskQueue<u32> = TaskQueue::new();
        q.schedule(5, 100, true);
        q.schedule(3, 100, true);
        q.schedule(4, 100, true);
        assert_eq!(q.drain_due(100).as_slice(), &[5, 3, 4]);
    }
}
