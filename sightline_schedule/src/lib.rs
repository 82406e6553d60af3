// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Schedule: deadline bookkeeping for host-driven engines.
//!
//! Engines in this workspace never touch a platform timer. Hosts pass
//! millisecond timestamps into every call, and "waiting" is a recorded
//! deadline inside one of the small structures in this crate:
//!
//! - [`TaskQueue`]: pending deadlines keyed by a caller-chosen group, with
//!   join (replace) and cancel semantics. Used for per-watcher delayed work
//!   where the group key doubles as the cancellation scope.
//! - [`Debounce`]: coalesces a burst of requests into one execution at the
//!   last-extended deadline.
//! - [`Throttle`]: runs a leading execution immediately and coalesces
//!   further requests into a single trailing execution.
//! - [`Interval`]: a fixed-period tick that reschedules itself when fired.
//!
//! None of these execute anything. They answer "is this due at `now`?" and
//! "when should the host call back?" ([`TaskQueue::next_due`] and friends);
//! the owner runs the work itself when a query says so.
//!
//! # Example
//!
//! ```rust
//! use sightline_schedule::TaskQueue;
//!
//! let mut queue: TaskQueue<u32> = TaskQueue::new();
//! queue.schedule(7, 1_100, true);
//! queue.schedule(9, 1_050, true);
//!
//! // Re-scheduling a group with `join` replaces its deadline.
//! queue.schedule(7, 1_200, true);
//!
//! assert_eq!(queue.next_due(), Some(1_050));
//! let due = queue.drain_due(1_100);
//! assert_eq!(due.as_slice(), &[9]);
//! assert_eq!(queue.next_due(), Some(1_200));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod queue;
mod rate;

pub use queue::TaskQueue;
pub use rate::{Debounce, Interval, Throttle};
