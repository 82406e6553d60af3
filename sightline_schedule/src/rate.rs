// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounce, throttle, and fixed-interval deadline helpers.

/// Coalesces a burst of requests into one execution.
///
/// Every [`Debounce::request`] pushes the deadline out to `now + window`
/// (join semantics), so an execution happens only once the burst has been
/// quiet for a full window. The owner polls [`Debounce::fire`] with the
/// current time and runs the work when it returns `true`.
#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    window: u64,
    deadline: Option<u64>,
}

impl Debounce {
    /// Creates a debounce with the given window in milliseconds.
    #[must_use]
    pub const fn new(window: u64) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Requests an execution, replacing any pending deadline.
    pub fn request(&mut self, now: u64) {
        self.deadline = Some(now + self.window);
    }

    /// Returns `true` if an execution is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    #[must_use]
    pub const fn next_due(&self) -> Option<u64> {
        self.deadline
    }

    /// Drops any pending deadline without executing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Consumes the pending deadline if it has passed.
    pub fn fire(&mut self, now: u64) -> bool {
        match self.deadline {
            Some(due) if due <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Runs a leading execution immediately and coalesces the rest.
///
/// The first [`Throttle::request`] in a quiet period returns `true` (run
/// now). Requests inside the interval record a single trailing deadline;
/// [`Throttle::fire`] consumes it once it passes.
#[derive(Clone, Copy, Debug)]
pub struct Throttle {
    interval: u64,
    last_run: Option<u64>,
    trailing: Option<u64>,
}

impl Throttle {
    /// Creates a throttle with the given minimum interval in milliseconds.
    #[must_use]
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            last_run: None,
            trailing: None,
        }
    }

    /// Requests an execution. Returns `true` if it should run right now.
    ///
    /// When the previous run is closer than the interval, a trailing
    /// deadline is recorded instead; repeated requests collapse into it.
    pub fn request(&mut self, now: u64) -> bool {
        match self.last_run {
            Some(last) if now < last + self.interval => {
                if self.trailing.is_none() {
                    self.trailing = Some(last + self.interval);
                }
                false
            }
            _ => {
                self.last_run = Some(now);
                self.trailing = None;
                true
            }
        }
    }

    /// The pending trailing deadline, if any.
    #[must_use]
    pub const fn next_due(&self) -> Option<u64> {
        self.trailing
    }

    /// Consumes the trailing deadline if it has passed.
    pub fn fire(&mut self, now: u64) -> bool {
        match self.trailing {
            Some(due) if due <= now => {
                self.trailing = None;
                self.last_run = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Forgets the previous run and any trailing deadline.
    pub fn reset(&mut self) {
        self.last_run = None;
        self.trailing = None;
    }
}

/// A fixed-period tick.
///
/// Stopped until [`Interval::start`]; each successful [`Interval::fire`]
/// reschedules the next tick a full period after `now`, so a host that
/// fell behind does not burst to catch up.
#[derive(Clone, Copy, Debug)]
pub struct Interval {
    period: u64,
    next: Option<u64>,
}

impl Interval {
    /// Creates a stopped interval with the given period in milliseconds.
    #[must_use]
    pub const fn new(period: u64) -> Self {
        Self { period, next: None }
    }

    /// Starts ticking. A no-op if already running.
    pub fn start(&mut self, now: u64) {
        if self.next.is_none() {
            self.next = Some(now + self.period);
        }
    }

    /// Stops ticking.
    pub fn stop(&mut self) {
        self.next = None;
    }

    /// Returns `true` if the interval is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// The next tick deadline, if running.
    #[must_use]
    pub const fn next_due(&self) -> Option<u64> {
        self.next
    }

    /// Consumes a due tick and schedules the next one.
    pub fn fire(&mut self, now: u64) -> bool {
        match self.next {
            Some(due) if due <= now => {
                self.next = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Debounce, Interval, Throttle};

    #[test]
    fn debounce_extends_deadline_across_a_burst() {
        let mut d = Debounce::new(100);
        d.request(0);
        d.request(50);
        d.request(90);

        // Still quiet at the original deadline; due a window after the
        // last request.
        assert!(!d.fire(100));
        assert!(!d.fire(189));
        assert!(d.fire(190));
        assert!(!d.is_pending());
        assert!(!d.fire(500));
    }

    #[test]
    fn debounce_cancel_drops_pending_work() {
        let mut d = Debounce::new(100);
        d.request(0);
        d.cancel();
        assert!(!d.fire(1_000));
    }

    #[test]
    fn throttle_leading_then_single_trailing() {
        let mut t = Throttle::new(50);
        assert!(t.request(0));
        assert!(!t.request(10));
        assert!(!t.request(20));
        assert_eq!(t.next_due(), Some(50));

        assert!(!t.fire(49));
        assert!(t.fire(50));
        assert!(!t.fire(50));

        // The trailing run counts as a run; the next request throttles
        // against it, and a leading run supersedes a pending trailing one.
        assert!(!t.request(70));
        assert_eq!(t.next_due(), Some(100));
        assert!(t.request(100));
        assert_eq!(t.next_due(), None);
    }

    #[test]
    fn throttle_runs_immediately_after_quiet_period() {
        let mut t = Throttle::new(50);
        assert!(t.request(0));
        assert!(t.request(60));
        assert_eq!(t.next_due(), None);
    }

    #[test]
    fn interval_reschedules_from_fire_time() {
        let mut i = Interval::new(75);
        assert!(!i.fire(1_000));
        i.start(0);
        assert_eq!(i.next_due(), Some(75));
        assert!(i.fire(75));
        assert_eq!(i.next_due(), Some(150));

        // A late host gets one tick, scheduled a full period out.
        assert!(i.fire(400));
        assert_eq!(i.next_due(), Some(475));

        i.stop();
        assert!(!i.fire(1_000));
    }
}
