//! Auto-scroll position for unattended screens.
//!
//! The timer lives in the app layer; this type only answers "where is the
//! table now" for a given tick time, so the whole cycle is testable with
//! synthetic instants:
//!
//! 1. scroll down at `speed` rows/s until the scroll end,
//! 2. dwell there for `pause`,
//! 3. jump to the top and dwell for `restart_delay`,
//! 4. start over.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    /// Rows per second.
    pub speed: f64,
    /// Tables longer than this only scroll down to this row.
    pub row_limit: usize,
    /// Dwell at the scroll end before jumping back to the top.
    pub pause: Duration,
    /// Dwell at the top before scrolling again.
    pub restart_delay: Duration,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            speed: 2.0,
            row_limit: 30,
            pause: Duration::from_millis(2000),
            restart_delay: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    Scrolling,
    AtEnd { since: Instant },
    AtTop { since: Instant },
}

#[derive(Debug, Clone)]
pub struct AutoScroll {
    settings: ScrollSettings,
    /// Fractional first-visible-row.
    offset: f64,
    phase: ScrollPhase,
    last_tick: Option<Instant>,
}

impl AutoScroll {
    pub fn new(settings: ScrollSettings) -> Self {
        Self {
            settings,
            offset: 0.0,
            phase: ScrollPhase::Scrolling,
            last_tick: None,
        }
    }

    /// Back to the top, ready to scroll on the next tick.
    pub fn reset(&mut self) {
        self.offset = 0.0;
        self.phase = ScrollPhase::Scrolling;
        self.last_tick = None;
    }

    pub fn offset(&self) -> usize {
        self.offset.max(0.0) as usize
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    /// Last row offset the auto-scroll travels to.
    pub fn scroll_end(&self, total_rows: usize, viewport_rows: usize) -> usize {
        total_rows
            .min(self.settings.row_limit.max(1))
            .saturating_sub(viewport_rows)
    }

    /// Manual scroll by `delta` rows, clamped to the table.
    pub fn scroll_by(&mut self, delta: isize, total_rows: usize, viewport_rows: usize) {
        let max = total_rows.saturating_sub(viewport_rows) as f64;
        self.offset = (self.offset.floor() + delta as f64).clamp(0.0, max);
    }

    /// Advance the cycle to `now`.
    pub fn tick(&mut self, now: Instant, total_rows: usize, viewport_rows: usize) -> ScrollPhase {
        let elapsed = self
            .last_tick
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        self.last_tick = Some(now);

        let end = self.scroll_end(total_rows, viewport_rows) as f64;

        self.phase = match self.phase {
            ScrollPhase::Scrolling => {
                if end <= 0.0 {
                    // Everything fits; nothing to scroll.
                    self.offset = 0.0;
                    ScrollPhase::Scrolling
                } else {
                    self.offset += self.settings.speed * elapsed.as_secs_f64();
                    if self.offset >= end {
                        self.offset = end;
                        tracing::debug!(row = end, "auto-scroll reached its end, pausing");
                        ScrollPhase::AtEnd { since: now }
                    } else {
                        ScrollPhase::Scrolling
                    }
                }
            }
            ScrollPhase::AtEnd { since } => {
                if now.saturating_duration_since(since) >= self.settings.pause {
                    self.offset = 0.0;
                    ScrollPhase::AtTop { since: now }
                } else {
                    ScrollPhase::AtEnd { since }
                }
            }
            ScrollPhase::AtTop { since } => {
                if now.saturating_duration_since(since) >= self.settings.restart_delay {
                    ScrollPhase::Scrolling
                } else {
                    ScrollPhase::AtTop { since }
                }
            }
        };
        self.phase
    }
}
