use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::domain::{MarkerCode, MarkerResult};

const STRONG_POINTS: i32 = 3;
const MEDIUM_POINTS: i32 = 2;
const WEAK_POINTS: i32 = 1;
const AUTOPASS_TOTAL: i32 = 10;

/// Why a claim bypassed manual financial review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutopassReason {
    TwoStrongs,
    OneStrongTwoMediums,
    #[serde(rename = "total_ge_10")]
    TotalGe10,
}

impl AutopassReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            AutopassReason::TwoStrongs => "two_strongs",
            AutopassReason::OneStrongTwoMediums => "one_strong_two_mediums",
            AutopassReason::TotalGe10 => "total_ge_10",
        }
    }
}

type AutopassRule = (fn(&AggregateResult) -> bool, AutopassReason);

/// Checked in order; the first matching rule names the reason.
const AUTOPASS_RULES: [AutopassRule; 3] = [
    (two_strongs, AutopassReason::TwoStrongs),
    (one_strong_two_mediums, AutopassReason::OneStrongTwoMediums),
    (total_ge_10, AutopassReason::TotalGe10),
];

fn two_strongs(result: &AggregateResult) -> bool {
    result.strong >= 2
}

fn one_strong_two_mediums(result: &AggregateResult) -> bool {
    result.strong >= 1 && result.medium >= 2
}

fn total_ge_10(result: &AggregateResult) -> bool {
    result.score_total >= AUTOPASS_TOTAL
}

/// Totals over the full marker battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub years_available: Vec<i32>,
    pub current_year_cap: i32,
    pub markers: BTreeMap<MarkerCode, MarkerResult>,
    pub score_total: i32,
    pub strong: usize,
    pub medium: usize,
    pub weak: usize,
    pub autopass: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autopass_reason: Option<AutopassReason>,
}

impl AggregateResult {
    pub fn from_markers(
        mut years_available: Vec<i32>,
        current_year_cap: i32,
        markers: BTreeMap<MarkerCode, MarkerResult>,
    ) -> Self {
        years_available.sort_unstable();
        years_available.dedup();

        let count = |points: i32| markers.values().filter(|m| m.points == points).count();
        let strong = markers
            .values()
            .filter(|marker| marker.points >= STRONG_POINTS)
            .count();
        let medium = count(MEDIUM_POINTS);
        let weak = count(WEAK_POINTS);
        let score_total = markers.values().map(|marker| marker.points).sum();

        let mut result = Self {
            years_available,
            current_year_cap,
            markers,
            score_total,
            strong,
            medium,
            weak,
            autopass: false,
            autopass_reason: None,
        };

        result.autopass_reason = AUTOPASS_RULES
            .iter()
            .find(|(rule, _)| rule(&result))
            .map(|(_, reason)| *reason);
        result.autopass = result.autopass_reason.is_some();
        result
    }

    pub fn marker(&self, code: MarkerCode) -> Option<&MarkerResult> {
        self.markers.get(&code)
    }

    pub fn triggered(&self) -> impl Iterator<Item = &MarkerResult> {
        self.markers.values().filter(|marker| marker.triggered)
    }
}
