//! Cancellable timers.
//!
//! A [`TimerSlot`] holds at most one running timer task.  Starting a timer
//! aborts whatever the slot was running and bumps its generation, so even a
//! tick that was already queued by the old task is recognisably stale.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::event::{ControlEvent, TimerKind};

pub struct TimerSlot {
    kind: TimerKind,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            generation: 0,
            handle: None,
        }
    }

    /// Fire every `period`, first tick immediately.  Replaces any running timer.
    pub fn start_interval(&mut self, period: Duration, tx: UnboundedSender<ControlEvent>) {
        self.stop();
        self.generation = self.generation.wrapping_add(1);
        let (kind, generation) = (self.kind, self.generation);

        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(ControlEvent::Timer { kind, generation }).is_err() {
                    break; // main loop gone
                }
            }
        }));
        tracing::debug!(?kind, generation, ?period, "interval timer started");
    }

    /// Fire once after `delay`.  Replaces any running timer.
    pub fn start_once(&mut self, delay: Duration, tx: UnboundedSender<ControlEvent>) {
        self.stop();
        self.generation = self.generation.wrapping_add(1);
        let (kind, generation) = (self.kind, self.generation);

        self.handle = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(ControlEvent::Timer { kind, generation });
        }));
        tracing::debug!(?kind, generation, ?delay, "one-shot timer started");
    }

    /// Cancel the running timer, if any.  Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(kind = ?self.kind, generation = self.generation, "timer stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// `true` when a tick with `generation` came from the timer this slot
    /// currently owns.
    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && generation == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<ControlEvent>) -> Vec<u64> {
        let mut gens = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if let ControlEvent::Timer { generation, .. } = ev {
                gens.push(generation);
            }
        }
        gens
    }

    #[tokio::test]
    async fn starting_twice_leaves_exactly_one_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = TimerSlot::new(TimerKind::Scroll);

        slot.start_interval(Duration::from_millis(5), tx.clone());
        slot.start_interval(Duration::from_millis(5), tx.clone());
        assert_eq!(slot.generation(), 2);

        time::sleep(Duration::from_millis(40)).await;
        let ticks = drain(&mut rx);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|&g| g == 2), "stale ticks: {ticks:?}");
        assert!(slot.is_active());
        assert!(slot.is_current(2));
        assert!(!slot.is_current(1));
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_silences_the_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = TimerSlot::new(TimerKind::Poll);

        slot.stop();
        slot.start_interval(Duration::from_millis(5), tx);
        time::sleep(Duration::from_millis(20)).await;
        slot.stop();
        slot.stop();
        assert!(!slot.is_active());
        assert!(!slot.is_current(slot.generation()));

        drain(&mut rx);
        time::sleep(Duration::from_millis(20)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn one_shot_fires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = TimerSlot::new(TimerKind::AutoStart);
        slot.start_once(Duration::from_millis(5), tx);

        time::sleep(Duration::from_millis(30)).await;
        assert_eq!(drain(&mut rx), vec![1]);
        assert!(!slot.is_active());
    }
}
