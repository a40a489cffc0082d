//! Metric access over multi-year RSBU statement sets.
//!
//! Values are kept exactly as supplied (numbers or locale-formatted text) and parsed on read,
//! so a missing key, a missing year and an unparsable cell all surface as `None` rather than
//! a fabricated zero.

pub mod lines;
mod numbers;
mod selection;
pub mod thresholds;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

pub use lines::LineKey;
pub use selection::{latest_pair_with, latest_year_with, lookback_years, YearPair, LOOKBACK_YEARS};

/// Raised when a statement payload cannot be interpreted structurally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatementError {
    #[error("unrecognised statement line key '{0}' (expected e.g. F1.1200)")]
    InvalidLineKey(String),
    #[error("evaluation year {year} is outside 1990..=2100")]
    YearOutOfRange { year: i32 },
}

/// Evaluation years accepted from configuration, requests and the CLI.
pub const EVALUATION_YEARS: RangeInclusive<i32> = 1990..=2100;

pub fn check_evaluation_year(year: i32) -> Result<i32, StatementError> {
    if EVALUATION_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(StatementError::YearOutOfRange { year })
    }
}

/// Cell value as delivered by the financial data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn parse(&self) -> Option<f64> {
        match self {
            RawValue::Number(value) => value.is_finite().then_some(*value),
            RawValue::Text(text) => numbers::parse_amount(text),
        }
    }
}

/// A single statement line with its per-year values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: BTreeMap<i32, Option<RawValue>>,
}

/// Immutable mapping from line key to yearly values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementSet {
    lines: BTreeMap<LineKey, LineItem>,
}

impl StatementSet {
    pub fn new(lines: BTreeMap<LineKey, LineItem>) -> Self {
        Self { lines }
    }

    pub fn builder() -> StatementSetBuilder {
        StatementSetBuilder::default()
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, key: LineKey) -> Option<&LineItem> {
        self.lines.get(&key)
    }

    pub fn lines(&self) -> impl Iterator<Item = (&LineKey, &LineItem)> {
        self.lines.iter()
    }

    /// Parsed value for `key` in `year`, or `None` when it is missing or unparsable.
    pub fn value(&self, key: LineKey, year: i32) -> Option<f64> {
        self.lines
            .get(&key)?
            .values
            .get(&year)?
            .as_ref()
            .and_then(RawValue::parse)
    }

    pub fn get_value(&self, form: u8, code: u16, year: i32) -> Option<f64> {
        self.value(LineKey::new(form, code), year)
    }

    /// True when `key` has at least one parsable value in any year.
    pub fn has_any(&self, key: LineKey) -> bool {
        self.lines
            .get(&key)
            .map(|item| {
                item.values
                    .values()
                    .any(|value| value.as_ref().and_then(RawValue::parse).is_some())
            })
            .unwrap_or(false)
    }

    /// Every year that appears under any line, whether or not the cell parses.
    pub fn available_years(&self) -> BTreeSet<i32> {
        self.lines
            .values()
            .flat_map(|item| item.values.keys().copied())
            .collect()
    }
}

pub fn available_years(set: &StatementSet) -> BTreeSet<i32> {
    set.available_years()
}

pub fn latest_year_at_or_before(years: &BTreeSet<i32>, cap: i32) -> Option<i32> {
    years.range(..=cap).next_back().copied()
}

/// Up to `n` most recent years at or before `cap`, newest first.
pub fn last_n_years(years: &BTreeSet<i32>, cap: i32, n: usize) -> Vec<i32> {
    years.range(..=cap).rev().take(n).copied().collect()
}

/// Incremental constructor used by callers assembling statements outside of JSON.
#[derive(Debug, Default)]
pub struct StatementSetBuilder {
    lines: BTreeMap<LineKey, LineItem>,
}

impl StatementSetBuilder {
    pub fn name(mut self, key: LineKey, name: &str) -> Self {
        self.lines.entry(key).or_default().name = name.to_string();
        self
    }

    pub fn value(mut self, key: LineKey, year: i32, value: f64) -> Self {
        self.lines
            .entry(key)
            .or_default()
            .values
            .insert(year, Some(RawValue::Number(value)));
        self
    }

    pub fn text(mut self, key: LineKey, year: i32, value: &str) -> Self {
        self.lines
            .entry(key)
            .or_default()
            .values
            .insert(year, Some(RawValue::Text(value.to_string())));
        self
    }

    pub fn series(mut self, key: LineKey, values: &[(i32, f64)]) -> Self {
        for (year, value) in values {
            self = self.value(key, *year, *value);
        }
        self
    }

    pub fn build(self) -> StatementSet {
        StatementSet::new(self.lines)
    }
}
