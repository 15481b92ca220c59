//! Display model. What the table shows, independent of any terminal.
//!
//! The UI layer turns a [`TableModel`] into widgets; everything decided
//! here (indicators, placeholder rows, error banners) is testable without
//! a backend.

use chrono::{DateTime, Local};

use super::column::ColumnSpec;
use super::format::{format_cell, CellDisplay};
use super::record::Record;
use super::sort::{Direction, SortState};
use super::view::{TableView, ViewStatus};

pub const EMPTY_MESSAGE: &str = "No records found";
pub const LOADING_MESSAGE: &str = "Loading…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: String,
    pub sortable: bool,
    /// Set on the active sort column only.
    pub indicator: Option<Direction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerTone {
    Muted,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRow {
    Cells(Vec<CellDisplay>),
    /// A single message spanning `span` columns.
    Banner { text: String, tone: BannerTone, span: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    pub header: Vec<HeaderCell>,
    pub rows: Vec<BodyRow>,
}

impl TableModel {
    pub fn build(view: &TableView) -> Self {
        let columns = view.columns();
        let rows = match view.status() {
            ViewStatus::Loading => vec![banner(LOADING_MESSAGE, BannerTone::Muted, columns.len())],
            ViewStatus::Failed(reason) => vec![banner(
                &format!("Failed to load data: {reason}"),
                BannerTone::Error,
                columns.len(),
            )],
            ViewStatus::Ready => render_rows(columns, view.visible()),
        };
        Self {
            header: render_header(columns, view.sort_state()),
            rows,
        }
    }
}

fn banner(text: &str, tone: BannerTone, span: usize) -> BodyRow {
    BodyRow::Banner {
        text: text.to_string(),
        tone,
        span,
    }
}

/// One header cell per column; only the active sort column carries an
/// indicator.
pub fn render_header(columns: &[ColumnSpec], sort: &SortState) -> Vec<HeaderCell> {
    columns
        .iter()
        .map(|c| HeaderCell {
            label: c.label.clone(),
            sortable: c.sortable,
            indicator: if c.sortable { sort.indicator(&c.field) } else { None },
        })
        .collect()
}

/// One row per record, one formatted cell per column.  No records yields a
/// single placeholder row across all columns.
pub fn render_rows<'a>(
    columns: &[ColumnSpec],
    records: impl Iterator<Item = &'a Record>,
) -> Vec<BodyRow> {
    let rows: Vec<BodyRow> = records
        .map(|r| {
            let cells: Vec<CellDisplay> = columns
                .iter()
                .map(|c| format_cell(r, &c.field, c.kind))
                .collect();
            debug_assert_eq!(cells.len(), columns.len());
            BodyRow::Cells(cells)
        })
        .collect();

    if rows.is_empty() {
        return vec![banner(EMPTY_MESSAGE, BannerTone::Muted, columns.len())];
    }
    rows
}

/// Counters shown above the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub filtered: usize,
    /// Local wall-clock time of the last successful fetch, `HH:MM:SS`.
    pub last_refresh: Option<String>,
}

pub fn render_stats(total: usize, filtered: usize, last_refresh: Option<DateTime<Local>>) -> Stats {
    Stats {
        total,
        filtered,
        last_refresh: last_refresh.map(|t| t.format("%H:%M:%S").to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::column::{ColumnKind, PanelDef};
    use crate::core::format::StatusBucket;
    use crate::core::record::record;
    use chrono::TimeZone;
    use serde_json::json;

    fn view() -> TableView {
        let mut def = PanelDef::nursing_evolutions();
        def.columns.truncate(3);
        def.columns[2].sortable = false;
        TableView::new(&def)
    }

    #[test]
    fn empty_view_renders_one_spanning_placeholder() {
        let mut v = view();
        v.replace_dataset(Vec::new(), Local::now());
        let model = TableModel::build(&v);
        assert_eq!(
            model.rows,
            vec![BodyRow::Banner {
                text: EMPTY_MESSAGE.into(),
                tone: BannerTone::Muted,
                span: 3
            }]
        );
    }

    #[test]
    fn filtered_to_nothing_still_renders_the_placeholder() {
        let mut v = view();
        v.replace_dataset(vec![record(&[("setor", json!("UTI"))])], Local::now());
        v.set_filter("setor", "UTI");
        v.set_filter("turno", "Noite");
        assert_eq!(TableModel::build(&v).rows.len(), 1);
    }

    #[test]
    fn failed_refresh_hides_previous_rows() {
        let mut v = view();
        v.replace_dataset(
            vec![
                record(&[("nm_paciente", json!("Maria"))]),
                record(&[("nm_paciente", json!("João"))]),
            ],
            Local::now(),
        );
        assert_eq!(TableModel::build(&v).rows.len(), 2);

        v.fail("HTTP 502: Bad Gateway");
        let rows = TableModel::build(&v).rows;
        assert_eq!(rows.len(), 1);
        match &rows[0] {
            BodyRow::Banner { text, tone, .. } => {
                assert_eq!(*tone, BannerTone::Error);
                assert!(text.contains("HTTP 502"));
            }
            other => panic!("expected error banner, got {other:?}"),
        }
    }

    #[test]
    fn rows_format_every_column() {
        let mut def = PanelDef::nursing_evolutions();
        def.columns.retain(|c| c.field == "nm_paciente" || c.field == "evol_medico");
        let mut v = TableView::new(&def);
        v.replace_dataset(vec![record(&[("evol_medico", json!("S"))])], Local::now());

        let rows = TableModel::build(&v).rows;
        let BodyRow::Cells(cells) = &rows[0] else {
            panic!("expected cells");
        };
        assert_eq!(cells[0], CellDisplay::Placeholder);
        assert!(matches!(cells[1], CellDisplay::Status { bucket: StatusBucket::Done, .. }));
    }

    #[test]
    fn only_the_active_column_has_an_indicator() {
        let mut v = view();
        v.replace_dataset(Vec::new(), Local::now());
        v.sort_by("nm_paciente", ColumnKind::Text);
        let header = TableModel::build(&v).header;
        let marked: Vec<_> = header.iter().filter(|h| h.indicator.is_some()).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].label, "Paciente");
        assert_eq!(marked[0].indicator, Some(Direction::Asc));
        assert!(!header[2].sortable);
    }

    #[test]
    fn stats_show_local_clock_time() {
        let at = Local.with_ymd_and_hms(2025, 10, 14, 7, 5, 9).unwrap();
        let stats = render_stats(10, 4, Some(at));
        assert_eq!(stats.last_refresh.as_deref(), Some("07:05:09"));
        assert_eq!((stats.total, stats.filtered), (10, 4));
        assert_eq!(render_stats(0, 0, None).last_refresh, None);
    }
}
