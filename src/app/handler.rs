//! Input and control handling. Maps key, mouse, timer and fetch events
//! to state mutations.

use std::time::Instant;

use chrono::Local;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::Action;
use crate::ui::table_widget;

use super::event::{ControlEvent, TimerKind};
use super::state::AppState;

/// Process a key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    state.status_message = None;

    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    if state.show_help {
        // Any key closes the help popup; only quit falls through.
        state.show_help = false;
        if state.config.match_key(key) != Some(Action::Quit) {
            return;
        }
    }

    // Digits sort by column position (1 = first column).
    if let KeyCode::Char(c @ '1'..='9') = key.code {
        if key.modifiers.is_empty() {
            let index = (c as usize) - ('1' as usize);
            sort_by_column(state, index);
            return;
        }
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    let total = state.view.filtered_len();
    let page = state.viewport_rows.max(1) as isize;

    match action {
        Action::Quit => state.should_quit = true,
        Action::ToggleHelp => state.show_help = true,
        Action::ScrollUp => state.scroll.scroll_by(-1, total, state.viewport_rows),
        Action::ScrollDown => state.scroll.scroll_by(1, total, state.viewport_rows),
        Action::PageUp => state.scroll.scroll_by(-page, total, state.viewport_rows),
        Action::PageDown => state.scroll.scroll_by(page, total, state.viewport_rows),
        Action::PrevColumn => {
            state.selected_column = state.selected_column.saturating_sub(1);
        }
        Action::NextColumn => {
            let last = state.view.columns().len().saturating_sub(1);
            state.selected_column = (state.selected_column + 1).min(last);
        }
        Action::SortColumn => sort_by_column(state, state.selected_column),
        Action::NextFilter => {
            let count = state.view.filters().len();
            if count > 0 {
                state.focused_filter = (state.focused_filter + 1) % count;
            }
        }
        Action::FilterForward => cycle_filter(state, true),
        Action::FilterBack => cycle_filter(state, false),
        Action::ClearFilters => {
            state.view.clear_filters();
            state.scroll.reset();
            state.status_message = Some("Filters cleared".into());
        }
        Action::ToggleAutoScroll => {
            if state.refresh.toggle_autoscroll() {
                state.scroll.reset();
                state.status_message = Some("Auto-scroll on".into());
            } else {
                state.status_message = Some("Auto-scroll paused".into());
            }
        }
        Action::Refresh => {
            if !state.refresh.request_fetch() {
                state.status_message = Some("Refresh already in progress".into());
            }
        }
    }
}

/// Process a mouse event: header clicks sort, the wheel scrolls.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    let total = state.view.filtered_len();
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let hit = table_widget::header_hit(
                state.table_area,
                state.view.columns(),
                mouse.column,
                mouse.row,
            );
            if let Some(index) = hit {
                sort_by_column(state, index);
            }
        }
        MouseEventKind::ScrollDown => state.scroll.scroll_by(3, total, state.viewport_rows),
        MouseEventKind::ScrollUp => state.scroll.scroll_by(-3, total, state.viewport_rows),
        _ => {}
    }
}

/// Process a timer tick or fetch completion.
pub fn handle_control(state: &mut AppState, event: ControlEvent) {
    match event {
        ControlEvent::Timer { kind, generation } => {
            if !state.refresh.is_current(kind, generation) {
                return;
            }
            match kind {
                TimerKind::Poll => {
                    state.refresh.request_fetch();
                }
                TimerKind::Scroll => {
                    let before = state.scroll.phase();
                    let after = state
                        .scroll
                        .tick(Instant::now(), state.view.filtered_len(), state.viewport_rows);
                    if std::mem::discriminant(&before) != std::mem::discriminant(&after) {
                        tracing::trace!(phase = ?after, offset = state.scroll.offset(), "auto-scroll");
                    }
                }
                TimerKind::AutoStart => {
                    if !state.refresh.is_autoscrolling() {
                        tracing::info!("auto-scroll started automatically");
                        state.refresh.start_autoscroll();
                        state.scroll.reset();
                    }
                }
            }
        }
        ControlEvent::Fetched { generation, result } => {
            if !state.refresh.finish_fetch(generation) {
                return;
            }
            match result {
                Ok(records) => {
                    tracing::info!(count = records.len(), "dataset refreshed");
                    state.view.replace_dataset(records, Local::now());
                }
                Err(err) => {
                    tracing::warn!(error = %err, "refresh failed");
                    state.view.fail(err.to_string());
                }
            }
        }
    }
}

fn sort_by_column(state: &mut AppState, index: usize) {
    if state.view.sort_by_column(index) {
        state.selected_column = index;
        state.scroll.reset();
        let sort = state.view.sort_state();
        tracing::debug!(field = ?sort.field, direction = ?sort.direction, "sorted");
    }
}

fn cycle_filter(state: &mut AppState, forward: bool) {
    let Some(key) = state.focused_filter_key().map(str::to_string) else {
        return;
    };
    state.view.cycle_filter(&key, forward);
    state.scroll.reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::mpsc;

    use crate::app::client::{FetchError, PanelClient};
    use crate::config::AppConfig;
    use crate::core::column::PanelDef;
    use crate::core::record::{cell_text, record};
    use crate::core::sort::Direction;
    use crate::core::view::ViewStatus;

    fn state() -> (AppState, mpsc::UnboundedReceiver<ControlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = PanelClient::new(
            "http://127.0.0.1:1/api/paneis/painel2/evolucoes".into(),
            Duration::from_millis(200),
        )
        .unwrap();
        let mut config = AppConfig::default();
        config.autoscroll_start_ms = 60_000;
        let state = AppState::mount(PanelDef::nursing_evolutions(), config, client, tx);
        (state, rx)
    }

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn patients(state: &AppState) -> Vec<String> {
        state
            .view
            .visible()
            .filter_map(|r| cell_text(r, "nm_paciente"))
            .collect()
    }

    /// Issue a fetch and complete it by hand with `result`.
    fn complete_fetch(state: &mut AppState, result: Result<Vec<crate::core::record::Record>, FetchError>) {
        state.refresh.shutdown();
        assert!(state.refresh.request_fetch());
        let generation = 1;
        handle_control(state, ControlEvent::Fetched { generation, result });
    }

    #[tokio::test]
    async fn successful_fetch_fills_the_view() {
        let (mut st, _rx) = state();
        complete_fetch(
            &mut st,
            Ok(vec![
                record(&[("nm_paciente", json!("Bruno"))]),
                record(&[("nm_paciente", json!("Ana"))]),
            ]),
        );
        assert_eq!(st.view.status(), &ViewStatus::Ready);
        assert_eq!(st.view.total(), 2);

        handle_key(&mut st, press('2'));
        assert_eq!(patients(&st), ["Ana", "Bruno"]);
        handle_key(&mut st, press('2'));
        assert_eq!(patients(&st), ["Bruno", "Ana"]);
        assert_eq!(st.view.sort_state().direction, Direction::Desc);
        assert_eq!(st.selected_column, 1);
    }

    #[tokio::test]
    async fn failed_fetch_shows_the_error() {
        let (mut st, _rx) = state();
        complete_fetch(
            &mut st,
            Err(FetchError::Status { status: 500, reason: "Internal Server Error".into() }),
        );
        assert_eq!(
            st.view.status(),
            &ViewStatus::Failed("HTTP 500: Internal Server Error".into())
        );
    }

    #[tokio::test]
    async fn stale_fetch_results_are_ignored() {
        let (mut st, _rx) = state();
        st.refresh.shutdown();
        handle_control(
            &mut st,
            ControlEvent::Fetched { generation: 42, result: Ok(vec![record(&[])]) },
        );
        assert_eq!(st.view.status(), &ViewStatus::Loading);
        assert_eq!(st.view.total(), 0);
    }

    #[tokio::test]
    async fn autoscroll_key_toggles_the_timer() {
        let (mut st, _rx) = state();
        handle_key(&mut st, press('a'));
        assert!(st.refresh.is_autoscrolling());
        handle_key(&mut st, press('a'));
        assert!(!st.refresh.is_autoscrolling());
    }

    #[tokio::test]
    async fn filter_keys_cycle_the_focused_filter() {
        let (mut st, _rx) = state();
        complete_fetch(
            &mut st,
            Ok(vec![
                record(&[("setor", json!("UTI")), ("turno", json!("Dia"))]),
                record(&[("setor", json!("Clínica")), ("turno", json!("Noite"))]),
            ]),
        );
        handle_key(&mut st, press('f'));
        assert_eq!(st.view.filter_state().get("setor"), Some("Clínica"));
        assert_eq!(st.view.filtered_len(), 1);

        handle_key(&mut st, KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        handle_key(&mut st, press('f'));
        assert_eq!(st.view.filter_state().get("turno"), Some("Dia"));
        assert_eq!(st.view.filtered_len(), 0);

        handle_key(&mut st, press('c'));
        assert_eq!(st.view.filtered_len(), 2);
    }

    #[tokio::test]
    async fn help_swallows_the_next_key() {
        let (mut st, _rx) = state();
        handle_key(&mut st, press('?'));
        assert!(st.show_help);
        handle_key(&mut st, press('a'));
        assert!(!st.show_help);
        assert!(!st.refresh.is_autoscrolling());
        handle_key(&mut st, press('q'));
        assert!(st.should_quit);
    }

    #[tokio::test]
    async fn unmount_stops_all_timers() {
        let (mut st, _rx) = state();
        handle_key(&mut st, press('a'));
        st.unmount();
        assert!(!st.refresh.is_polling());
        assert!(!st.refresh.is_autoscrolling());
    }
}
