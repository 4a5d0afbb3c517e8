//! Terminal and clock events.
//!
//! Wraps crossterm events into a simpler enum and runs background tasks that
//! forward them, plus a once-per-second clock tick, over a single channel so
//! the main loop stays non-blocking.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::core::clock::until_next_second;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// A wall-clock second boundary passed.
    Tick,
}

/// Spawns the terminal reader and the clock, returning their shared channel.
pub fn spawn_event_sources(poll_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_terminal_reader(tx.clone(), poll_rate);
    spawn_clock(tx);
    rx
}

fn spawn_terminal_reader(tx: mpsc::UnboundedSender<AppEvent>, poll_rate: Duration) {
    // crossterm's poll/read block, so they get a thread of their own.
    tokio::task::spawn_blocking(move || loop {
        if tx.is_closed() {
            break;
        }
        if !event::poll(poll_rate).unwrap_or(false) {
            continue;
        }
        let Ok(ev) = event::read() else { continue };
        let app_event = match ev {
            CtEvent::Key(k) => AppEvent::Key(k),
            CtEvent::Mouse(m) => AppEvent::Mouse(m),
            CtEvent::Resize(w, h) => AppEvent::Resize(w, h),
            _ => continue,
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });
}

/// Tick on every second boundary: first wait out the current second, then
/// keep a fixed one-second period.
fn spawn_clock(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let now = chrono::Local::now().naive_local();
        tokio::time::sleep(until_next_second(now)).await;

        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });
}
