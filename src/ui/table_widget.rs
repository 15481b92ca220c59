//! Custom Ratatui widget that renders a [`TableModel`] as a sortable
//! table with a fixed header row.
//!
//! Column geometry comes from [`column_rects`] so that mouse hit-testing
//! and drawing always agree on where a column starts.

use std::rc::Rc;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::core::{
    column::ColumnSpec,
    display::{BodyRow, HeaderCell, TableModel},
    format::CellDisplay,
    sort::Direction,
};

use super::theme::Theme;

/// Blank cells between two columns.
const COLUMN_SPACING: u16 = 1;

// ───────────────────────────────────────── geometry ──────────

/// Split `area` into one rect per column.  Widths are shared out in
/// proportion to each column's configured width.
pub fn column_rects(area: Rect, columns: &[ColumnSpec]) -> Rc<[Rect]> {
    Layout::horizontal(columns.iter().map(|c| Constraint::Fill(c.width.max(1))))
        .spacing(COLUMN_SPACING)
        .split(area)
}

/// Body rows that fit below the header in the table's inner area.
pub fn body_rows(inner: Rect) -> usize {
    inner.height.saturating_sub(1) as usize
}

/// Column index under a click at (`x`, `y`), if it landed on the header.
pub fn header_hit(inner: Rect, columns: &[ColumnSpec], x: u16, y: u16) -> Option<usize> {
    if inner.height == 0 || y != inner.y {
        return None;
    }
    let header = Rect { height: 1, ..inner };
    column_rects(header, columns)
        .iter()
        .position(|r| x >= r.x && x < r.right())
}

fn indicator(direction: Direction) -> &'static str {
    match direction {
        Direction::Asc => "▲",
        Direction::Desc => "▼",
    }
}

// ───────────────────────────────────────── widget ────────────

/// The table widget itself. Created fresh each frame.
pub struct PanelTable<'a> {
    model: &'a TableModel,
    columns: &'a [ColumnSpec],
    /// First body row shown.
    offset: usize,
    /// Column the keyboard sort action applies to.
    selected_column: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> PanelTable<'a> {
    pub fn new(model: &'a TableModel, columns: &'a [ColumnSpec]) -> Self {
        Self {
            model,
            columns,
            offset: 0,
            selected_column: None,
            block: None,
        }
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn selected_column(mut self, index: usize) -> Self {
        self.selected_column = Some(index);
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn header_line(&self, cell: &HeaderCell, selected: bool) -> Line<'static> {
        let style = if selected {
            Theme::header_selected_style()
        } else {
            Theme::header_style()
        };
        let mut spans = vec![Span::styled(cell.label.clone(), style)];
        if let Some(direction) = cell.indicator {
            spans.push(Span::styled(
                format!(" {}", indicator(direction)),
                Theme::sort_indicator_style(),
            ));
        }
        Line::from(spans)
    }
}

fn cell_span(cell: &CellDisplay) -> Span<'_> {
    match cell {
        CellDisplay::Placeholder => Span::styled(cell.text(), Theme::placeholder_style()),
        CellDisplay::Text(text) => Span::styled(text.as_str(), Theme::cell_style()),
        CellDisplay::Status { bucket, label } => {
            Span::styled(label.as_str(), Theme::status_style(*bucket))
        }
    }
}

impl<'a> Widget for PanelTable<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };
        if inner.height == 0 || inner.width == 0 || self.columns.is_empty() {
            return;
        }

        // ── header ─────────────────────────────────────────────
        let header_area = Rect { height: 1, ..inner };
        let rects = column_rects(header_area, self.columns);
        for (i, (cell, rect)) in self.model.header.iter().zip(rects.iter()).enumerate() {
            let line = self.header_line(cell, self.selected_column == Some(i));
            buf.set_line(rect.x, rect.y, &line, rect.width);
        }

        // ── body ───────────────────────────────────────────────
        let height = body_rows(inner);
        // A shrunken dataset may leave the offset past the end.
        let offset = self.offset.min(self.model.rows.len().saturating_sub(1));
        let visible = self
            .model
            .rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(height);

        for (i, (row_idx, row)) in visible.enumerate() {
            let y = inner.y + 1 + i as u16;
            match row {
                BodyRow::Cells(cells) => {
                    if row_idx % 2 == 1 {
                        buf.set_style(Rect { y, height: 1, ..inner }, Theme::stripe_style());
                    }
                    for (cell, rect) in cells.iter().zip(rects.iter()) {
                        let line = Line::from(cell_span(cell));
                        buf.set_line(rect.x, y, &line, rect.width);
                    }
                }
                BodyRow::Banner { text, tone, .. } => {
                    let line = Line::from(Span::styled(text.as_str(), Theme::banner_style(*tone)))
                        .centered();
                    line.render(Rect { y, height: 1, ..inner }, buf);
                }
            }
        }

        // Rows hidden below the viewport.
        let remaining = self.model.rows.len().saturating_sub(offset + height);
        if remaining > 0 && inner.width > 12 {
            let more = format!(" +{remaining} ");
            let width = more.len() as u16;
            let x = inner.right().saturating_sub(width);
            buf.set_stringn(
                x,
                area.bottom().saturating_sub(1),
                more,
                width as usize,
                Theme::dim_style(),
            );
        }
    }
}
