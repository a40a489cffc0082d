use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use super::domain::{Audit, MarkerCode, MarkerResult, RegistrySignals};
use super::MarkerInput;
use crate::workflows::statements::latest_year_with;
use crate::workflows::statements::lines::{
    LONG_TERM_INVESTMENTS, RECEIVABLES, SHORT_TERM_INVESTMENTS, TOTAL_ASSETS,
};
use crate::workflows::statements::thresholds::{
    approx_eq, greater_or_equal, greater_than, less_or_equal, pct_change, ratio,
};

const TAX_COLLAPSE: f64 = -0.9;
const RECEIVABLES_SHARE_LIMIT: f64 = 0.40;
const INVESTMENTS_SHARE_LIMIT: f64 = 0.30;
const MIN_SIGNALS: usize = 2;

/// True when a tax series fell by 90% or more between `prev` and `curr`.
pub(crate) fn tax_collapsed(series: &BTreeMap<i32, f64>, prev: i32, curr: i32) -> Option<bool> {
    let prev_amount = *series.get(&prev)?;
    let curr_amount = *series.get(&curr)?;
    if !greater_than(prev_amount, 0.0) {
        return None;
    }
    pct_change(prev_amount, curr_amount).map(|change| less_or_equal(change, TAX_COLLAPSE))
}

/// A previously paid tax that is no longer reported, or reported as zero.
fn tax_vanished(series: &BTreeMap<i32, f64>, prev: i32, curr: i32) -> Option<bool> {
    let prev_amount = *series.get(&prev)?;
    if !greater_than(prev_amount, 0.0) {
        return Some(false);
    }
    Some(series.get(&curr).map_or(true, |amount| approx_eq(*amount, 0.0)))
}

fn activity_unconfirmed(signals: &RegistrySignals, year: i32) -> Option<bool> {
    let egrul = signals.egrul_active.get(&year).copied();
    let rosstat = signals.rosstat_active.get(&year).copied();
    match (egrul, rosstat) {
        (None, None) => None,
        (egrul, rosstat) => Some(egrul == Some(false) || rosstat == Some(false)),
    }
}

pub(crate) fn off_balance_indicators(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M19;
    let Some(signals) = input.signals else {
        return MarkerResult::not_applicable(
            code,
            "нет данных налоговых и статистических реестров",
            Audit::new().into_value(),
        );
    };

    let set = input.statements;
    let Some((year, [total])) = latest_year_with(set, [TOTAL_ASSETS], input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет данных по валюте баланса (1600)",
            Audit::new().into_value(),
        );
    };
    let prev = year - 1;

    let receivables = set.value(RECEIVABLES, year);
    let long_term = set.value(LONG_TERM_INVESTMENTS, year);
    let short_term = set.value(SHORT_TERM_INVESTMENTS, year);
    let receivables_share = ratio(receivables, Some(total));
    let investments_share = ratio(long_term.zip(short_term).map(|(a, b)| a + b), Some(total));

    let property = tax_collapsed(&signals.property_tax, prev, year);
    let transport = tax_vanished(&signals.transport_tax, prev, year);
    let inactive = activity_unconfirmed(signals, year);
    debug!(
        marker = code.label(),
        year,
        ?property,
        ?transport,
        ?inactive,
        ?receivables_share,
        ?investments_share,
        "off-balance indicators"
    );

    let audit = Audit::new()
        .line(year, TOTAL_ASSETS, Some(total))
        .line(year, RECEIVABLES, receivables)
        .line(year, LONG_TERM_INVESTMENTS, long_term)
        .line(year, SHORT_TERM_INVESTMENTS, short_term)
        .metric(year, "receivables_share", receivables_share)
        .metric(year, "investments_share", investments_share)
        .note(
            "signals",
            json!({
                "property_tax_collapsed": property,
                "transport_tax_vanished": transport,
                "activity_unconfirmed": inactive,
            }),
        )
        .into_value();

    if property.is_none() && transport.is_none() && inactive.is_none() {
        return MarkerResult::not_applicable(
            code,
            format!("реестровые сигналы за {prev}–{year} отсутствуют"),
            audit,
        );
    }
    if receivables_share.is_none() && investments_share.is_none() {
        return MarkerResult::not_applicable(
            code,
            format!("нет данных по дебиторке и вложениям в {year}"),
            audit,
        );
    }

    let signal_count = [property, transport, inactive]
        .into_iter()
        .filter(|signal| *signal == Some(true))
        .count();
    let heavy_assets = receivables_share.is_some_and(|share| greater_or_equal(share, RECEIVABLES_SHARE_LIMIT))
        || investments_share.is_some_and(|share| greater_or_equal(share, INVESTMENTS_SHARE_LIMIT));

    if signal_count >= MIN_SIGNALS && heavy_assets {
        MarkerResult::triggered(
            code,
            2,
            format!("{signal_count} реестровых сигнала при крупной дебиторке или вложениях в {year}"),
            audit,
        )
    } else {
        MarkerResult::clear(
            code,
            format!("реестровых сигналов: {signal_count}, крупные активы: {heavy_assets}"),
            audit,
        )
    }
}
