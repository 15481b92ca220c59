//! Central application state.
//!
//! Everything the panel screen mutates lives here, created on mount and torn
//! down on unmount.  Rendering reads `&AppState`; event handling takes
//! `&mut AppState`.

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::AppConfig;
use crate::core::{column::PanelDef, scroll::AutoScroll, view::TableView};

use super::client::PanelClient;
use super::event::ControlEvent;
use super::refresh::RefreshController;

/// Top-level application state.
pub struct AppState {
    pub panel: PanelDef,
    /// Dataset, filtered view, sort and filter state.
    pub view: TableView,
    /// Current scroll position and auto-scroll cycle.
    pub scroll: AutoScroll,
    /// Poll / auto-scroll timers and the fetch guard.
    pub refresh: RefreshController,
    pub config: AppConfig,
    /// Column the keyboard sort action applies to.
    pub selected_column: usize,
    /// Filter the cycle actions apply to.
    pub focused_filter: usize,
    pub show_help: bool,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// Body rows visible in the last frame.
    pub viewport_rows: usize,
    /// Table area of the last frame, for mouse hit-testing.
    pub table_area: Rect,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Monotonic frame tick (drives the spinner).
    pub tick: u64,
}

impl AppState {
    /// Build the view for `panel` and start its timers.
    pub fn mount(
        panel: PanelDef,
        config: AppConfig,
        client: PanelClient,
        tx: UnboundedSender<ControlEvent>,
    ) -> Self {
        let mut refresh = RefreshController::new(client, tx, config.refresh_settings());
        refresh.mount();
        tracing::info!(panel = %panel.id, "panel mounted");

        Self {
            view: TableView::new(&panel),
            scroll: AutoScroll::new(config.scroll_settings()),
            refresh,
            panel,
            config,
            selected_column: 0,
            focused_filter: 0,
            show_help: false,
            should_quit: false,
            viewport_rows: 0,
            table_area: Rect::default(),
            status_message: None,
            tick: 0,
        }
    }

    /// Stop every timer; nothing fires after this returns.
    pub fn unmount(&mut self) {
        self.refresh.shutdown();
        tracing::info!(panel = %self.panel.id, "panel unmounted");
    }

    pub fn focused_filter_key(&self) -> Option<&str> {
        self.view
            .filters()
            .get(self.focused_filter)
            .map(|f| f.key.as_str())
    }
}
