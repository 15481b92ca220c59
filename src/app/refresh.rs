//! Refresh & auto-scroll controller. Owns the timers and the fetch guard.
//!
//! Polling and auto-scroll are independent: either can run without the
//! other.  Every timer and fetch reports back through the control channel;
//! the controller only decides whether a message is still current.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::client::PanelClient;
use super::event::{ControlEvent, TimerKind};
use super::timer::TimerSlot;

/// Timer periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    pub poll_interval: Duration,
    /// How often the auto-scroll position is advanced.
    pub scroll_tick: Duration,
    /// Delay before auto-scroll turns itself on after mount.
    pub autoscroll_start: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            scroll_tick: Duration::from_millis(50),
            autoscroll_start: Duration::from_secs(5),
        }
    }
}

pub struct RefreshController {
    client: PanelClient,
    tx: UnboundedSender<ControlEvent>,
    settings: RefreshSettings,
    poll: TimerSlot,
    scroll: TimerSlot,
    autostart: TimerSlot,
    /// Generation of the fetch currently in flight.
    in_flight: Option<u64>,
    fetch_generation: u64,
    fetch_task: Option<JoinHandle<()>>,
}

impl RefreshController {
    pub fn new(client: PanelClient, tx: UnboundedSender<ControlEvent>, settings: RefreshSettings) -> Self {
        Self {
            client,
            tx,
            settings,
            poll: TimerSlot::new(TimerKind::Poll),
            scroll: TimerSlot::new(TimerKind::Scroll),
            autostart: TimerSlot::new(TimerKind::AutoStart),
            in_flight: None,
            fetch_generation: 0,
            fetch_task: None,
        }
    }

    /// Mount: start polling (first fetch immediately) and arm the
    /// auto-scroll auto-start.
    pub fn mount(&mut self) {
        self.start_polling();
        self.autostart
            .start_once(self.settings.autoscroll_start, self.tx.clone());
    }

    /// Unmount: stop every timer and abandon the in-flight fetch.
    pub fn shutdown(&mut self) {
        self.stop_polling();
        self.stop_autoscroll();
        self.autostart.stop();
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        self.in_flight = None;
    }

    // ── polling ────────────────────────────────────────────────

    pub fn start_polling(&mut self) {
        self.poll
            .start_interval(self.settings.poll_interval, self.tx.clone());
    }

    pub fn stop_polling(&mut self) {
        self.poll.stop();
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_active()
    }

    /// Start a fetch unless one is still running.  Returns whether a
    /// request was issued.
    pub fn request_fetch(&mut self) -> bool {
        if let Some(generation) = self.in_flight {
            tracing::debug!(generation, "previous fetch still in flight, skipping");
            return false;
        }
        self.fetch_generation = self.fetch_generation.wrapping_add(1);
        let generation = self.fetch_generation;
        self.in_flight = Some(generation);

        let client = self.client.clone();
        let tx = self.tx.clone();
        self.fetch_task = Some(tokio::spawn(async move {
            let result = client.fetch().await;
            let _ = tx.send(ControlEvent::Fetched { generation, result });
        }));
        tracing::debug!(generation, url = self.client.url(), "fetch started");
        true
    }

    /// Accept a fetch completion.  Returns `false` for stale results.
    pub fn finish_fetch(&mut self, generation: u64) -> bool {
        if self.in_flight != Some(generation) {
            tracing::debug!(generation, "dropping stale fetch result");
            return false;
        }
        self.in_flight = None;
        self.fetch_task = None;
        true
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    // ── auto-scroll ────────────────────────────────────────────

    /// Start the scroll timer, replacing any running one.
    pub fn start_autoscroll(&mut self) {
        self.autostart.stop();
        self.scroll
            .start_interval(self.settings.scroll_tick, self.tx.clone());
    }

    pub fn stop_autoscroll(&mut self) {
        self.scroll.stop();
    }

    /// Returns the new state.
    pub fn toggle_autoscroll(&mut self) -> bool {
        if self.is_autoscrolling() {
            self.stop_autoscroll();
            // A manual stop wins over the pending auto-start.
            self.autostart.stop();
            false
        } else {
            self.start_autoscroll();
            true
        }
    }

    pub fn is_autoscrolling(&self) -> bool {
        self.scroll.is_active()
    }

    /// Whether a timer tick belongs to a timer that is still running.
    pub fn is_current(&self, kind: TimerKind, generation: u64) -> bool {
        match kind {
            TimerKind::Poll => self.poll.is_current(generation),
            TimerKind::Scroll => self.scroll.is_current(generation),
            TimerKind::AutoStart => self.autostart.is_current(generation),
        }
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn controller() -> (RefreshController, mpsc::UnboundedReceiver<ControlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        // Nothing listens on port 1; fetches fail fast and harmlessly.
        let client = PanelClient::new(
            "http://127.0.0.1:1/api/paneis/painel2/evolucoes".into(),
            Duration::from_millis(200),
        )
        .unwrap();
        let settings = RefreshSettings {
            poll_interval: Duration::from_millis(10),
            scroll_tick: Duration::from_millis(5),
            autoscroll_start: Duration::from_millis(5),
        };
        (RefreshController::new(client, tx, settings), rx)
    }

    #[tokio::test]
    async fn overlapping_fetches_are_skipped() {
        let (mut ctl, _rx) = controller();
        assert!(ctl.request_fetch());
        assert!(!ctl.request_fetch());
        assert!(ctl.is_fetching());

        assert!(!ctl.finish_fetch(99));
        assert!(ctl.finish_fetch(1));
        assert!(!ctl.is_fetching());
        assert!(ctl.request_fetch());
    }

    #[tokio::test]
    async fn failed_fetch_reports_back_with_its_generation() {
        let (mut ctl, mut rx) = controller();
        ctl.request_fetch();
        loop {
            match rx.recv().await {
                Some(ControlEvent::Fetched { generation, result }) => {
                    assert_eq!(generation, 1);
                    assert!(result.is_err());
                    assert!(ctl.finish_fetch(generation));
                    break;
                }
                Some(_) => continue,
                None => panic!("channel closed"),
            }
        }
    }

    #[tokio::test]
    async fn starting_autoscroll_twice_keeps_one_timer() {
        let (mut ctl, _rx) = controller();
        ctl.start_autoscroll();
        let first = ctl.scroll.generation();
        ctl.start_autoscroll();
        assert!(ctl.is_autoscrolling());
        assert!(!ctl.is_current(TimerKind::Scroll, first));
        assert!(ctl.is_current(TimerKind::Scroll, first + 1));
    }

    #[tokio::test]
    async fn toggling_off_cancels_the_pending_auto_start() {
        let (mut ctl, _rx) = controller();
        ctl.mount();
        assert!(ctl.is_polling());
        assert!(ctl.toggle_autoscroll());
        assert!(!ctl.toggle_autoscroll());
        assert!(!ctl.is_current(TimerKind::AutoStart, 1));
    }

    #[tokio::test]
    async fn shutdown_stops_everything_and_is_repeatable() {
        let (mut ctl, _rx) = controller();
        ctl.mount();
        ctl.start_autoscroll();
        ctl.request_fetch();

        ctl.shutdown();
        ctl.shutdown();
        assert!(!ctl.is_polling());
        assert!(!ctl.is_autoscrolling());
        assert!(!ctl.is_fetching());
    }
}
