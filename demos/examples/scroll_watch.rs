// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A feed of rows scrolling past a viewport, watched three ways.
//!
//! This example shows:
//! - a plain watcher with a 50% threshold,
//! - a delayed watcher that only reports rows dwelling at least 200ms,
//! - a polling watcher that notices geometry changes nobody signals.
//!
//! Run:
//! - `cargo run -p sightline_demos --example scroll_watch`

use kurbo::Rect;
use sightline_demos::SimHost;
use sightline_watch::{Engine, ScanEngine, WatcherOptions};

const ROW_HEIGHT: f64 = 100.0;
const ROW_GAP: f64 = 20.0;

fn row_rect(i: u32) -> Rect {
    let top = f64::from(i) * (ROW_HEIGHT + ROW_GAP);
    Rect::new(0.0, top, 320.0, top + ROW_HEIGHT)
}

fn main() {
    let mut host = SimHost::new(320.0, 480.0);
    for i in 0..20 {
        host.place(i, row_rect(i));
    }

    let mut engine: ScanEngine<SimHost> = ScanEngine::new();

    // Rows 0..18 get plain half-visibility watchers.
    for i in 0..18 {
        let options = WatcherOptions::new(0)
            .threshold(0.5)
            .on_enter(move |w| println!("[{:>5}ms] row {i} entered", w.time_in()))
            .on_leave(move |w| println!("[{:>5}ms] row {i} left", w.time_out()));
        engine.observe(i, options, 0).expect("fresh target");
    }

    // Row 18 only counts after dwelling 200ms in view.
    let dwell = WatcherOptions::new(0)
        .threshold(0.5)
        .delay(200)
        .on_enter(|w| println!("[{:>5}ms] row 18 dwelled long enough", w.time_in()));
    engine.observe(18, dwell, 0).expect("fresh target");

    // Row 19 is repositioned behind the engine's back, so it polls.
    let polled = WatcherOptions::new(0)
        .threshold(0.5)
        .polling()
        .on_enter(|w| println!("[{:>5}ms] row 19 appeared (polling)", w.time_in()))
        .on_leave(|w| println!("[{:>5}ms] row 19 vanished (polling)", w.time_out()));
    engine.observe(19, polled, 0).expect("fresh target");

    // Let the debounced first rebuild run.
    let mut now = 0;
    while let Some(due) = engine.next_due() {
        if due > 100 {
            break;
        }
        now = due;
        engine.tick(&host, now);
    }

    // Scroll the feed in 90px steps, one every 30ms, ticking as deadlines
    // come due (trailing scans, poll passes, delayed deliveries).
    println!("-- scrolling --");
    for step in 1_u32..=40 {
        now = 100 + u64::from(step) * 30;
        host.scroll_to(f64::from(step) * 90.0);
        engine.notify_scroll(&host, Some(0), now);
        while let Some(due) = engine.next_due() {
            if due > now {
                break;
            }
            engine.tick(&host, due);
        }
    }

    // Teleport row 19 into view without any signal: only the polling lane
    // can see this.
    println!("-- teleporting row 19 --");
    let y = host.scroll_y();
    host.place(19, Rect::new(0.0, y + 10.0, 320.0, y + 110.0));
    for _ in 0..4 {
        now += 75;
        engine.tick(&host, now);
    }

    engine.destroy();
}
