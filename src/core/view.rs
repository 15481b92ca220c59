//! The tabular data view. Dataset, derived filtered/sorted rows, and the
//! sort/filter state that produces them.
//!
//! The filtered view is stored as indices into the current dataset and is
//! rebuilt from scratch whenever the dataset, the filters, or the sort
//! change, so it can never refer to rows of an earlier fetch.

use chrono::{DateTime, Local};

use super::column::{ColumnKind, ColumnSpec, FilterSpec, PanelDef};
use super::filter::{self, FilterState};
use super::record::Record;
use super::sort::{self, SortState};

/// What the table body currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewStatus {
    /// No fetch has completed yet.
    #[default]
    Loading,
    Ready,
    /// The most recent fetch failed; the body shows only this message.
    Failed(String),
}

pub struct TableView {
    columns: Vec<ColumnSpec>,
    filters: Vec<FilterSpec>,
    dataset: Vec<Record>,
    /// Filtered + sorted indices into `dataset`.
    rows: Vec<usize>,
    sort: SortState,
    sort_kind: ColumnKind,
    filter: FilterState,
    status: ViewStatus,
    last_refresh: Option<DateTime<Local>>,
}

impl TableView {
    pub fn new(panel: &PanelDef) -> Self {
        Self {
            columns: panel.columns.clone(),
            filters: panel.filters.clone(),
            dataset: Vec::new(),
            rows: Vec::new(),
            sort: SortState::default(),
            sort_kind: ColumnKind::default(),
            filter: FilterState::default(),
            status: ViewStatus::Loading,
            last_refresh: None,
        }
    }

    // ── mutations ──────────────────────────────────────────────

    /// Swap in a freshly fetched dataset and re-derive the view with the
    /// current filters and sort.  Filter selections that no longer occur in
    /// the new data are dropped.
    pub fn replace_dataset(&mut self, records: Vec<Record>, fetched_at: DateTime<Local>) {
        self.dataset = records;
        for spec in &self.filters {
            let options = filter::options_for(&self.dataset, &spec.key);
            if self.filter.retain_available(&spec.key, &options) {
                tracing::debug!(filter = %spec.key, "selected value vanished, filter cleared");
            }
        }
        self.status = ViewStatus::Ready;
        self.last_refresh = Some(fetched_at);
        self.recompute();
    }

    /// Record a failed refresh.  The body stops showing rows until the next
    /// successful fetch.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ViewStatus::Failed(message.into());
    }

    /// Sort by `field`: toggles direction when it is already the active
    /// column, otherwise starts ascending.
    pub fn sort_by(&mut self, field: &str, kind: ColumnKind) {
        self.sort.select(field);
        self.sort_kind = kind;
        self.recompute();
    }

    /// Sort by the column at `index` if it is sortable.
    pub fn sort_by_column(&mut self, index: usize) -> bool {
        let Some(col) = self.columns.get(index).filter(|c| c.sortable) else {
            return false;
        };
        let (field, kind) = (col.field.clone(), col.kind);
        self.sort_by(&field, kind);
        true
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        self.filter.set(key, value);
        self.recompute();
    }

    /// Step `key` to the next (or previous) value in `[all, options…]`.
    pub fn cycle_filter(&mut self, key: &str, forward: bool) {
        let options = self.filter_options(key);
        let next = filter::cycle_value(&options, self.filter.get(key), forward);
        self.set_filter(key, next.as_deref().unwrap_or(""));
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.rows = self
            .dataset
            .iter()
            .enumerate()
            .filter(|(_, r)| self.filter.matches(r))
            .map(|(i, _)| i)
            .collect();

        if let Some(field) = self.sort.field.as_deref() {
            sort::sort_rows(&self.dataset, &mut self.rows, field, self.sort_kind, self.sort.direction);
        }
    }

    // ── queries ────────────────────────────────────────────────

    /// Records of the filtered view, in display order.
    pub fn visible(&self) -> impl Iterator<Item = &Record> + '_ {
        self.rows.iter().map(|&i| &self.dataset[i])
    }

    pub fn filter_options(&self, key: &str) -> Vec<String> {
        filter::options_for(&self.dataset, key)
    }

    pub fn total(&self) -> usize {
        self.dataset.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        self.last_refresh
    }
}
