//! Event types and the terminal event reader.
//!
//! Terminal input arrives on [`AppEvent`]; timers and fetch completions
//! arrive on [`ControlEvent`].  Both are plain channel messages consumed by
//! the single main loop, which is the only place state is mutated.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::core::record::Record;

use super::client::FetchError;

/// High-level terminal events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

/// Which timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Poll,
    Scroll,
    AutoStart,
}

/// Messages from timer and fetch tasks.
#[derive(Debug)]
pub enum ControlEvent {
    Timer { kind: TimerKind, generation: u64 },
    Fetched {
        generation: u64,
        result: Result<Vec<Record>, FetchError>,
    },
}

/// Spawns a reader thread that polls the terminal and forwards events
/// through the returned channel.  Sends [`AppEvent::Tick`] when nothing
/// happened within `tick_rate`.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    // crossterm's poll blocks, so it gets its own thread rather than a task
    // on the single-threaded runtime.
    std::thread::spawn(move || loop {
        let has_event = event::poll(tick_rate).unwrap_or(false);
        let app_event = if has_event {
            match event::read() {
                Ok(CtEvent::Key(k)) => AppEvent::Key(k),
                Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
                Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                _ => continue,
            }
        } else {
            AppEvent::Tick
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });

    rx
}
