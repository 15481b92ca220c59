//! Layout helpers. Split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout: title/stats, filters, table, status bar.
pub struct AppLayout {
    pub title_area: Rect,
    pub filter_area: Rect,
    pub table_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // panel title + counters
                Constraint::Length(1), // filter selectors
                Constraint::Min(3),    // table (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            title_area: chunks[0],
            filter_area: chunks[1],
            table_area: chunks[2],
            status_area: chunks[3],
        }
    }
}
