//! Sort engine. Sort state machine and type-aware comparators.

use std::cmp::Ordering;

use super::column::ColumnKind;
use super::format::{parse_timestamp, StatusBucket};
use super::record::{cell_number, cell_text, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

/// Active sort column and direction.  Starts unset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    pub field: Option<String>,
    pub direction: Direction,
}

impl SortState {
    /// Same field → flip direction; new field → ascending on that field.
    pub fn select(&mut self, field: &str) {
        if self.field.as_deref() == Some(field) {
            self.direction = self.direction.flipped();
        } else {
            self.field = Some(field.to_string());
            self.direction = Direction::Asc;
        }
    }

    /// Direction shown on `field`'s header, `None` when it is not the active column.
    pub fn indicator(&self, field: &str) -> Option<Direction> {
        (self.field.as_deref() == Some(field)).then_some(self.direction)
    }
}

// ───────────────────────────────────────── comparators ───────

/// Normalised sort key of one cell.  Every variant has a total order.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Timestamp(i64),
    Number(f64),
    Rank(u8),
    Text(String),
}

impl SortKey {
    fn of(record: &Record, field: &str, kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Date | ColumnKind::Datetime => SortKey::Timestamp(
                cell_text(record, field)
                    .and_then(|raw| parse_timestamp(&raw))
                    .map_or(i64::MIN, |p| p.at.and_utc().timestamp()),
            ),
            ColumnKind::Number => SortKey::Number(cell_number(record, field)),
            ColumnKind::Status => {
                SortKey::Rank(StatusBucket::classify(cell_text(record, field).as_deref()).rank())
            }
            ColumnKind::Text => {
                SortKey::Text(cell_text(record, field).unwrap_or_default().to_lowercase())
            }
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Rank(a), SortKey::Rank(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Keys of one column always share a variant.
            _ => Ordering::Equal,
        }
    }
}

/// Stable-sort `rows` (indices into `dataset`) by `field`.
///
/// Keys are computed once per row. Descending is the exact reverse of
/// ascending, so ties come out in reverse incoming order.
pub fn sort_rows(
    dataset: &[Record],
    rows: &mut Vec<usize>,
    field: &str,
    kind: ColumnKind,
    direction: Direction,
) {
    let mut keyed: Vec<(SortKey, usize)> = rows
        .iter()
        .map(|&i| (SortKey::of(&dataset[i], field, kind), i))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| a.compare(b));

    *rows = keyed.into_iter().map(|(_, i)| i).collect();
    if direction == Direction::Desc {
        rows.reverse();
    }
}
