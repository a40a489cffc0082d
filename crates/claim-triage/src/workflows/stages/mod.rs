//! Stage classifiers: small scoring tables whose points are summed per stage and mapped onto
//! a verification verdict.

mod company;
mod legal;
mod presence;
mod red_flags;
mod verdict;

#[cfg(test)]
mod tests;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::workflows::statements::StatementSet;
use crate::workflows::status::{dates, normalize_status};

pub use company::{
    evaluate_company_status, evaluate_registration_age, evaluate_reporting_freshness,
    expected_report_year,
};
pub use legal::{evaluate_case_status, evaluate_claim_terms, evaluate_debt_confirmation};
pub use presence::{check_presence, DataPresence, DebtorInn, PresenceInput};
pub use red_flags::{score_red_flags, RedFlags};
pub use verdict::{legal_verdict, structural_verdict, VerdictStatus, VerificationVerdict};

/// Raised when a numeric stage input cannot be scored at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64, StageError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StageError::NonFinite { field, value })
    }
}

/// Which scoring table produced a [`StageScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageFactor {
    CompanyStatus,
    RegistrationAge,
    ReportingFreshness,
    RedFlags,
    ClaimTerms,
    DebtConfirmation,
    CaseStatus,
}

/// Points awarded by one scoring table, with the analyst-facing comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageScore {
    pub factor: StageFactor,
    pub points: i32,
    pub comment: String,
    pub not_applicable: bool,
}

impl StageScore {
    pub fn scored(factor: StageFactor, points: i32, comment: impl Into<String>) -> Self {
        Self {
            factor,
            points,
            comment: comment.into(),
            not_applicable: false,
        }
    }

    pub fn not_applicable(factor: StageFactor, comment: impl Into<String>) -> Self {
        Self {
            factor,
            points: 0,
            comment: comment.into(),
            not_applicable: true,
        }
    }
}

/// Components, their total and the verdict for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub components: Vec<StageScore>,
    pub total_points: i32,
    pub verdict: VerificationVerdict,
}

fn summarize(
    components: Vec<StageScore>,
    classify: fn(i32, &[String]) -> VerificationVerdict,
) -> StageOutcome {
    let total_points = components.iter().map(|component| component.points).sum();
    let comments: Vec<String> = components
        .iter()
        .map(|component| component.comment.trim())
        .filter(|comment| !comment.is_empty())
        .map(str::to_string)
        .collect();
    let verdict = classify(total_points, &comments);

    StageOutcome {
        components,
        total_points,
        verdict,
    }
}

/// Inputs for the structural (company viability) stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralInput {
    #[serde(default)]
    pub company_status: String,
    #[serde(default, with = "dates::dotted")]
    pub registration_date: Option<NaiveDate>,
    #[serde(default, with = "dates::dotted")]
    pub last_report_date: Option<NaiveDate>,
    #[serde(default)]
    pub red_flags: RedFlags,
    /// When present, red flags left unanswered are derived from these statements.
    #[serde(default)]
    pub statements: Option<StatementSet>,
}

/// Scores company status, age, reporting freshness and red flags as of `today`.
#[derive(Debug, Clone, Copy)]
pub struct StructuralStage {
    today: NaiveDate,
    evaluation_year: i32,
}

impl StructuralStage {
    pub fn new(today: NaiveDate, evaluation_year: i32) -> Self {
        Self {
            today,
            evaluation_year,
        }
    }

    pub fn evaluate(&self, input: &StructuralInput) -> StageOutcome {
        let status = normalize_status(&input.company_status);

        let registration = match input.registration_date {
            Some(date) => evaluate_registration_age(date, self.today),
            None => StageScore::not_applicable(StageFactor::RegistrationAge, "нет даты регистрации"),
        };
        let freshness = match input.last_report_date {
            Some(date) => evaluate_reporting_freshness(date, self.today),
            None => StageScore::not_applicable(
                StageFactor::ReportingFreshness,
                "нет даты последней отчётности",
            ),
        };
        let flags = match &input.statements {
            Some(statements) => input
                .red_flags
                .or(RedFlags::from_statements(statements, self.evaluation_year)),
            None => input.red_flags,
        };

        let outcome = summarize(
            vec![
                evaluate_company_status(&status, self.today),
                registration,
                freshness,
                score_red_flags(&flags),
            ],
            structural_verdict,
        );

        info!(
            stage = "structural",
            total_points = outcome.total_points,
            verified = outcome.verdict.verified,
            status = %outcome.verdict.status,
            "stage evaluated"
        );
        outcome
    }
}

/// Inputs for the legal (court case) stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegalInput {
    /// Years since the underlying event.
    #[serde(default)]
    pub case_age_years: Option<f64>,
    #[serde(default)]
    pub company_status: String,
    /// Years since a claim could first have been filed.
    #[serde(default)]
    pub time_to_claim_years: Option<f64>,
    #[serde(default)]
    pub case_sum: Option<f64>,
    /// Claimed sum divided by the court-awarded sum.
    #[serde(default)]
    pub sum_ratio: Option<f64>,
    #[serde(default)]
    pub case_status: String,
}

/// Scores claim timing, debt confirmation and case status.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegalStage;

impl LegalStage {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, input: &LegalInput) -> Result<StageOutcome, StageError> {
        let status = normalize_status(&input.company_status);
        let status_text = if status.is_empty() {
            input.company_status.as_str()
        } else {
            status.normalized_for_eval.as_str()
        };

        let terms = match input.case_age_years {
            Some(case_age) => {
                evaluate_claim_terms(case_age, status_text, input.time_to_claim_years)?
            }
            None => StageScore::not_applicable(StageFactor::ClaimTerms, "нет данных о возрасте дела"),
        };

        let outcome = summarize(
            vec![
                terms,
                evaluate_debt_confirmation(input.case_sum, input.sum_ratio)?,
                evaluate_case_status(&input.case_status),
            ],
            legal_verdict,
        );

        info!(
            stage = "legal",
            total_points = outcome.total_points,
            verified = outcome.verdict.verified,
            status = %outcome.verdict.status,
            "stage evaluated"
        );
        Ok(outcome)
    }
}
