//! Nineteen independent financial risk markers over a statement set.
//!
//! Every evaluator is a pure function of [`MarkerInput`]; the engine runs all of them and
//! hands the results to [`aggregate::AggregateResult`]. A marker whose required lines are
//! absent reports `not_applicable` instead of guessing.

pub mod aggregate;
mod assets;
mod domain;
mod dynamics;
pub mod export;
mod integrity;
mod liquidity;
mod registry;
mod solvency;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use tracing::info;

use crate::workflows::statements::StatementSet;

pub use aggregate::{AggregateResult, AutopassReason};
pub use domain::{MarkerCode, MarkerResult, RegistrySignals, Severity};

/// Everything a single evaluator may look at.
#[derive(Debug, Clone, Copy)]
pub struct MarkerInput<'a> {
    pub statements: &'a StatementSet,
    /// Evaluation year; no marker reads data after it.
    pub year: i32,
    pub signals: Option<&'a RegistrySignals>,
}

impl<'a> MarkerInput<'a> {
    pub fn new(statements: &'a StatementSet, year: i32) -> Self {
        Self {
            statements,
            year,
            signals: None,
        }
    }

    pub fn with_signals(mut self, signals: &'a RegistrySignals) -> Self {
        self.signals = Some(signals);
        self
    }
}

type Evaluator = fn(&MarkerInput<'_>) -> MarkerResult;

impl MarkerCode {
    fn evaluator(self) -> Evaluator {
        match self {
            MarkerCode::M1 => solvency::negative_equity,
            MarkerCode::M2 => liquidity::current_liquidity,
            MarkerCode::M3 => liquidity::quick_liquidity,
            MarkerCode::M4 => liquidity::absolute_liquidity,
            MarkerCode::M5 => assets::fixed_asset_drop,
            MarkerCode::M6 => assets::long_term_investment_shift,
            MarkerCode::M7 => dynamics::frozen_receivables,
            MarkerCode::M8 => dynamics::creditors_up_revenue_down,
            MarkerCode::M9 => liquidity::cash_to_creditors,
            MarkerCode::M10 => solvency::debt_load,
            MarkerCode::M11 => dynamics::inventory_up_revenue_down,
            MarkerCode::M12 => assets::large_asset_shifts,
            MarkerCode::M13 => integrity::reporting_problems,
            MarkerCode::M14 => solvency::bankruptcy_obligation,
            MarkerCode::M15 => assets::fixed_asset_share_drop,
            MarkerCode::M16 => assets::short_term_investment_growth,
            MarkerCode::M17 => dynamics::current_assets_flat_creditors_up,
            MarkerCode::M18 => integrity::structural_anomalies,
            MarkerCode::M19 => registry::off_balance_indicators,
        }
    }

    /// Run this marker alone.
    pub fn evaluate(self, input: &MarkerInput<'_>) -> MarkerResult {
        (self.evaluator())(input)
    }
}

/// Runs the full marker battery for one evaluation year.
#[derive(Debug, Clone, Copy)]
pub struct MarkerEngine {
    year: i32,
}

impl MarkerEngine {
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn evaluate(
        &self,
        statements: &StatementSet,
        signals: Option<&RegistrySignals>,
    ) -> AggregateResult {
        let input = MarkerInput {
            statements,
            year: self.year,
            signals,
        };

        let markers: BTreeMap<MarkerCode, MarkerResult> = MarkerCode::ALL
            .into_iter()
            .map(|code| (code, code.evaluate(&input)))
            .collect();

        let result = AggregateResult::from_markers(
            statements.available_years().into_iter().collect(),
            self.year,
            markers,
        );

        info!(
            year = self.year,
            score_total = result.score_total,
            strong = result.strong,
            medium = result.medium,
            weak = result.weak,
            autopass = result.autopass,
            reason = result.autopass_reason.map(AutopassReason::as_str),
            "marker battery evaluated"
        );

        result
    }
}

/// Evaluate every marker for `year` and aggregate the outcome.
pub fn evaluate_all(
    statements: &StatementSet,
    year: i32,
    signals: Option<&RegistrySignals>,
) -> AggregateResult {
    MarkerEngine::new(year).evaluate(statements, signals)
}
