use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{StageFactor, StageScore};
use crate::workflows::statements::lines::{FIXED_ASSETS, REVENUE};
use crate::workflows::statements::thresholds::{less_or_equal, less_than};
use crate::workflows::statements::StatementSet;

const WINDOW: i32 = 3;
const MISSING_CELLS_LIMIT: usize = 3;

/// Qualitative checklist answers; `None` means the question was not answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedFlags {
    #[serde(default)]
    pub no_finance_3y: Option<bool>,
    #[serde(default)]
    pub no_data_3y: Option<bool>,
    #[serde(default)]
    pub staff_reduction: Option<bool>,
    #[serde(default)]
    pub fixed_assets_reduction: Option<bool>,
    #[serde(default)]
    pub bankruptcy_intent: Option<bool>,
}

impl RedFlags {
    /// Flags that can be read off the statements for the three years ending at `year`.
    pub fn from_statements(set: &StatementSet, year: i32) -> Self {
        let window: Vec<i32> = ((year - WINDOW + 1)..=year).rev().collect();

        let no_data = set
            .lines()
            .all(|(key, _)| window.iter().all(|y| set.value(*key, *y).is_none()));

        let missing_cells = window
            .iter()
            .flat_map(|y| [set.value(REVENUE, *y), set.value(FIXED_ASSETS, *y)])
            .filter(Option::is_none)
            .count();

        let fixed_assets: Option<Vec<f64>> =
            window.iter().map(|y| set.value(FIXED_ASSETS, *y)).collect();
        let shrinking = fixed_assets.map(|values| match values.as_slice() {
            &[latest, middle, oldest] => {
                less_or_equal(latest, middle)
                    && less_or_equal(middle, oldest)
                    && less_than(latest, oldest)
            }
            _ => false,
        });

        debug!(year, no_data, missing_cells, ?shrinking, "red flags derived from statements");

        Self {
            no_finance_3y: Some(missing_cells > MISSING_CELLS_LIMIT),
            no_data_3y: Some(no_data),
            staff_reduction: None,
            fixed_assets_reduction: shrinking,
            bankruptcy_intent: None,
        }
    }

    /// Answers given here win; gaps are filled from `other`.
    pub fn or(self, other: RedFlags) -> RedFlags {
        RedFlags {
            no_finance_3y: self.no_finance_3y.or(other.no_finance_3y),
            no_data_3y: self.no_data_3y.or(other.no_data_3y),
            staff_reduction: self.staff_reduction.or(other.staff_reduction),
            fixed_assets_reduction: self.fixed_assets_reduction.or(other.fixed_assets_reduction),
            bankruptcy_intent: self.bankruptcy_intent.or(other.bankruptcy_intent),
        }
    }

    fn checklist(&self) -> [(Option<bool>, i32, &'static str); 5] {
        [
            (self.no_finance_3y, -10, "нет финансовой отчётности за 3 года"),
            (self.no_data_3y, -5, "нет данных за 3 года"),
            (self.staff_reduction, -4, "сокращение штата"),
            (self.fixed_assets_reduction, -7, "сокращение основных средств"),
            (self.bankruptcy_intent, -5, "намерение обратиться с заявлением о банкротстве"),
        ]
    }
}

pub fn score_red_flags(flags: &RedFlags) -> StageScore {
    let checklist = flags.checklist();
    if checklist.iter().all(|(answer, _, _)| answer.is_none()) {
        return StageScore::not_applicable(StageFactor::RedFlags, "красные флаги не заполнены");
    }

    let points: i32 = checklist
        .iter()
        .filter(|(answer, _, _)| *answer == Some(true))
        .map(|(_, points, _)| points)
        .sum();
    let raised: Vec<&str> = checklist
        .iter()
        .filter(|(answer, _, _)| *answer == Some(true))
        .map(|(_, _, label)| *label)
        .collect();
    let unanswered: Vec<&str> = checklist
        .iter()
        .filter(|(answer, _, _)| answer.is_none())
        .map(|(_, _, label)| *label)
        .collect();

    let mut comment = Vec::new();
    if !raised.is_empty() {
        comment.push(format!("Красные флаги: {}", raised.join(", ")));
    }
    if !unanswered.is_empty() {
        comment.push(format!("Не проверено: {}", unanswered.join(", ")));
    }

    debug!(points, raised = raised.len(), unanswered = unanswered.len(), "red flags scored");
    StageScore::scored(StageFactor::RedFlags, points, comment.join(". "))
}
