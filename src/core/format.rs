//! Column formatter. Raw cell value + column kind → display cell.
//!
//! Formatting never fails: unparsable dates fall back to the raw text and
//! unknown status tokens fall into the pending bucket.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::column::ColumnKind;
use super::record::{is_truthy, value_text, Record};

/// Shown for null / empty / falsy cells.
pub const PLACEHOLDER: &str = "-";

/// Label of the pending badge when the status cell is empty.
pub const PENDING_LABEL: &str = "Pendente";

const DONE_TOKENS: &[&str] = &["feito", "feita", "s"];
const NOT_DONE_TOKENS: &[&str] = &["não feita", "nao feita", "não feito", "nao feito", "n", "x"];

// ───────────────────────────────────────── status ────────────

/// Ternary classification of a free-text evolution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBucket {
    Done,
    Pending,
    NotDone,
}

impl StatusBucket {
    /// Trim + case-fold, then look the token up.  Anything unrecognised,
    /// including empty input, is pending.
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return StatusBucket::Pending;
        };
        let token = raw.trim().to_lowercase();
        if DONE_TOKENS.contains(&token.as_str()) {
            StatusBucket::Done
        } else if NOT_DONE_TOKENS.contains(&token.as_str()) {
            StatusBucket::NotDone
        } else {
            StatusBucket::Pending
        }
    }

    /// Sort rank: done highest, not-done lowest.
    pub fn rank(self) -> u8 {
        match self {
            StatusBucket::Done => 3,
            StatusBucket::Pending => 2,
            StatusBucket::NotDone => 1,
        }
    }

    /// Visual marker for the bucket (pending shows its own label instead).
    pub fn marker(self) -> &'static str {
        match self {
            StatusBucket::Done => "✔",
            StatusBucket::NotDone => "✘",
            StatusBucket::Pending => PENDING_LABEL,
        }
    }
}

// ───────────────────────────────────────── cells ─────────────

/// What a single table cell displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellDisplay {
    Placeholder,
    Text(String),
    Status { bucket: StatusBucket, label: String },
}

impl CellDisplay {
    pub fn text(&self) -> &str {
        match self {
            CellDisplay::Placeholder => PLACEHOLDER,
            CellDisplay::Text(s) => s,
            CellDisplay::Status { label, .. } => label,
        }
    }
}

/// Format the `field` of `record` for a column of the given kind.
pub fn format_cell(record: &Record, field: &str, kind: ColumnKind) -> CellDisplay {
    format_value(record.get(field), kind)
}

/// Format a raw value for a column of the given kind.
pub fn format_value(value: Option<&Value>, kind: ColumnKind) -> CellDisplay {
    let text = value.and_then(value_text);

    match kind {
        ColumnKind::Date | ColumnKind::Datetime => match text.as_deref().map(str::trim) {
            None | Some("") => CellDisplay::Placeholder,
            Some(raw) => match parse_timestamp(raw) {
                Some(parsed) => CellDisplay::Text(parsed.display(kind)),
                None => CellDisplay::Text(raw.to_string()),
            },
        },
        ColumnKind::Status => {
            let bucket = StatusBucket::classify(text.as_deref());
            let label = match bucket {
                StatusBucket::Pending => match text.as_deref().map(str::trim) {
                    None | Some("") => PENDING_LABEL.to_string(),
                    Some(raw) => raw.to_string(),
                },
                other => other.marker().to_string(),
            };
            CellDisplay::Status { bucket, label }
        }
        ColumnKind::Number | ColumnKind::Text => {
            if is_truthy(value) {
                CellDisplay::Text(text.unwrap_or_default())
            } else {
                CellDisplay::Placeholder
            }
        }
    }
}

// ───────────────────────────────────────── dates ─────────────

/// A successfully parsed date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub at: NaiveDateTime,
    /// Whether the source text carried a time of day.
    pub has_time: bool,
}

impl ParsedTimestamp {
    fn display(self, kind: ColumnKind) -> String {
        if kind == ColumnKind::Datetime && self.has_time {
            self.at.format("%d/%m/%Y %H:%M").to_string()
        } else {
            self.at.format("%d/%m/%Y").to_string()
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse the date shapes the panel API emits.  Offsets are dropped: the
/// wall-clock time as written is what the ward expects to see.
pub fn parse_timestamp(raw: &str) -> Option<ParsedTimestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedTimestamp { at: dt.naive_local(), has_time: true });
    }
    // Flask's JSON encoder writes datetimes as RFC 2822 ("Tue, 14 Oct 2025 07:00:00 GMT").
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(ParsedTimestamp { at: dt.naive_local(), has_time: true });
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ParsedTimestamp { at, has_time: true });
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(ParsedTimestamp { at: d.and_time(chrono::NaiveTime::MIN), has_time: false });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(v: Value) -> CellDisplay {
        format_value(Some(&v), ColumnKind::Status)
    }

    #[test]
    fn done_tokens_yield_the_done_marker() {
        for raw in ["s", "S", " feito ", "FEITA"] {
            assert_eq!(
                status(json!(raw)),
                CellDisplay::Status { bucket: StatusBucket::Done, label: "✔".into() },
                "{raw:?}"
            );
        }
    }

    #[test]
    fn not_done_tokens_yield_the_not_done_marker() {
        for raw in ["não feita", "NÃO FEITA", "nao feita", "n", "X "] {
            match status(json!(raw)) {
                CellDisplay::Status { bucket, .. } => assert_eq!(bucket, StatusBucket::NotDone, "{raw:?}"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn everything_else_is_pending() {
        assert_eq!(
            status(json!("xyz")),
            CellDisplay::Status { bucket: StatusBucket::Pending, label: "xyz".into() }
        );
        assert_eq!(
            format_value(None, ColumnKind::Status),
            CellDisplay::Status { bucket: StatusBucket::Pending, label: PENDING_LABEL.into() }
        );
        assert_eq!(
            status(json!("  ")),
            CellDisplay::Status { bucket: StatusBucket::Pending, label: PENDING_LABEL.into() }
        );
        match status(json!(1)) {
            CellDisplay::Status { bucket, .. } => assert_eq!(bucket, StatusBucket::Pending),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn null_dates_render_the_placeholder() {
        assert_eq!(format_value(None, ColumnKind::Date), CellDisplay::Placeholder);
        assert_eq!(format_value(Some(&Value::Null), ColumnKind::Datetime), CellDisplay::Placeholder);
        assert_eq!(format_value(Some(&json!("")), ColumnKind::Date), CellDisplay::Placeholder);
    }

    #[test]
    fn unparsable_dates_pass_through() {
        assert_eq!(
            format_value(Some(&json!("ontem")), ColumnKind::Date),
            CellDisplay::Text("ontem".into())
        );
    }

    #[test]
    fn dates_render_in_brazilian_order() {
        assert_eq!(
            format_value(Some(&json!("2025-10-14")), ColumnKind::Date).text(),
            "14/10/2025"
        );
        assert_eq!(
            format_value(Some(&json!("Tue, 14 Oct 2025 07:30:00 GMT")), ColumnKind::Datetime).text(),
            "14/10/2025 07:30"
        );
        assert_eq!(
            format_value(Some(&json!("14/10/2025 19:00")), ColumnKind::Datetime).text(),
            "14/10/2025 19:00"
        );
        assert_eq!(
            format_value(Some(&json!("14/10/2025")), ColumnKind::Datetime).text(),
            "14/10/2025"
        );
    }

    #[test]
    fn falsy_numbers_and_text_render_the_placeholder() {
        assert_eq!(format_value(Some(&json!(0)), ColumnKind::Number), CellDisplay::Placeholder);
        assert_eq!(format_value(Some(&json!("")), ColumnKind::Text), CellDisplay::Placeholder);
        assert_eq!(format_value(Some(&json!(12)), ColumnKind::Number).text(), "12");
        assert_eq!(format_value(Some(&json!("UTI 2")), ColumnKind::Text).text(), "UTI 2");
    }

    #[test]
    fn ranks_put_done_above_pending_above_not_done() {
        assert!(StatusBucket::Done.rank() > StatusBucket::Pending.rank());
        assert!(StatusBucket::Pending.rank() > StatusBucket::NotDone.rank());
    }
}
