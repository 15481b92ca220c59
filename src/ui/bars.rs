//! One-line bars around the table: the title with counters, and the filter
//! selectors.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::display::Stats;
use crate::core::filter::FilterState;
use crate::core::column::FilterSpec;

use super::theme::Theme;

/// Panel title on the left, record counters and refresh time on the right.
pub struct StatsBar<'a> {
    pub title: &'a str,
    pub stats: &'a Stats,
    pub autoscroll: bool,
    /// False once the poll timer is stopped; the refresh time is then stale.
    pub polling: bool,
}

impl StatsBar<'_> {
    fn counters(&self) -> String {
        let refreshed = self.stats.last_refresh.as_deref().unwrap_or("--:--:--");
        let paused = if self.polling { "" } else { " (paused)" };
        let scroll = if self.autoscroll { "auto" } else { "manual" };
        format!(
            "Total: {}  Showing: {}  Updated: {}{}  Scroll: {} ",
            self.stats.total, self.stats.filtered, refreshed, paused, scroll
        )
    }
}

impl Widget for StatsBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let title = Line::from(Span::styled(format!(" {}", self.title), Theme::title_style()));
        buf.set_line(area.x, area.y, &title, area.width);

        let counters = self.counters();
        let width = counters.chars().count() as u16;
        if width < area.width {
            let x = area.right() - width;
            buf.set_stringn(x, area.y, &counters, width as usize, Theme::dim_style());
        }
    }
}

/// `Setor: UTI   Turno: (all)`; the focused filter is highlighted.
pub struct FilterBar<'a> {
    pub filters: &'a [FilterSpec],
    pub state: &'a FilterState,
    pub focused: usize,
}

/// Shown for a filter with no value selected.
pub const ALL_LABEL: &str = "(all)";

impl FilterBar<'_> {
    pub fn line(&self) -> Line<'static> {
        let mut spans = vec![Span::raw(" ")];
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("   "));
            }
            let value = self.state.get(&filter.key).unwrap_or(ALL_LABEL);
            spans.push(Span::styled(
                format!("{}: ", filter.label),
                Theme::filter_label_style(),
            ));
            spans.push(Span::styled(
                value.to_string(),
                Theme::filter_value_style(i == self.focused),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || self.filters.is_empty() {
            return;
        }
        buf.set_line(area.x, area.y, &self.line(), area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_line_shows_selected_values() {
        let filters = vec![FilterSpec::new("setor", "Setor"), FilterSpec::new("turno", "Turno")];
        let mut state = FilterState::default();
        state.set("setor", "UTI");
        let bar = FilterBar { filters: &filters, state: &state, focused: 1 };
        assert_eq!(bar.line().to_string(), " Setor: UTI   Turno: (all)");
    }

    #[test]
    fn counters_fall_back_before_first_refresh() {
        let stats = Stats { total: 0, filtered: 0, last_refresh: None };
        let bar = StatsBar { title: "Evoluções", stats: &stats, autoscroll: false, polling: true };
        assert_eq!(
            bar.counters(),
            "Total: 0  Showing: 0  Updated: --:--:--  Scroll: manual "
        );
    }

    #[test]
    fn counters_flag_a_stopped_poll_timer() {
        let stats = Stats { total: 12, filtered: 3, last_refresh: Some("14:05:09".into()) };
        let bar = StatsBar { title: "Evoluções", stats: &stats, autoscroll: true, polling: false };
        assert_eq!(
            bar.counters(),
            "Total: 12  Showing: 3  Updated: 14:05:09 (paused)  Scroll: auto "
        );
    }
}
