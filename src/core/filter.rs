//! Filter state. One selected value per filterable field.

use std::collections::{BTreeMap, BTreeSet};

use super::record::{cell_text, Record};

/// Selected value per filter key.  A missing or empty value means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    selected: BTreeMap<String, String>,
}

impl FilterState {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.selected
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Set `key` to `value`; an empty value removes the constraint.
    pub fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.selected.remove(key);
        } else {
            self.selected.insert(key.to_string(), value.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// `true` when `record` satisfies every active constraint.
    pub fn matches(&self, record: &Record) -> bool {
        self.selected
            .iter()
            .all(|(key, want)| cell_text(record, key).as_deref() == Some(want.as_str()))
    }

    /// Drop the selection for `key` when its value no longer occurs in
    /// `options`.  Returns `true` when something was dropped.
    pub fn retain_available(&mut self, key: &str, options: &[String]) -> bool {
        let stale = self.selected.get(key).is_some_and(|v| !options.contains(v));
        if stale {
            self.selected.remove(key);
        }
        stale
    }
}

/// Distinct non-empty values of `key` across `dataset`, sorted.
pub fn options_for(dataset: &[Record], key: &str) -> Vec<String> {
    dataset
        .iter()
        .filter_map(|r| cell_text(r, key))
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Next value after `current` in the cycle `[all, options…]`.
///
/// `None` stands for "all".  Walks backwards when `forward` is false.
pub fn cycle_value(options: &[String], current: Option<&str>, forward: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    // Position 0 is "all", option i sits at i + 1.
    let len = options.len() + 1;
    let pos = current
        .and_then(|c| options.iter().position(|o| o == c))
        .map_or(0, |i| i + 1);
    let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
    next.checked_sub(1).map(|i| options[i].clone())
}
