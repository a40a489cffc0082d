use serde_json::json;
use tracing::debug;

use super::domain::{Audit, MarkerCode, MarkerResult};
use super::MarkerInput;
use crate::workflows::statements::lines::{
    CREDITORS, CURRENT_ASSETS, CURRENT_LIABILITIES, INVENTORY, REVENUE, TOTAL_ASSETS,
    TOTAL_LIABILITIES,
};
use crate::workflows::statements::thresholds::{approx_eq, greater_than, less_than};
use crate::workflows::statements::{latest_year_with, LineKey, LOOKBACK_YEARS};

const KEY_LINES: [LineKey; 5] = [
    TOTAL_ASSETS,
    TOTAL_LIABILITIES,
    REVENUE,
    CURRENT_ASSETS,
    CURRENT_LIABILITIES,
];
const CORE_LINES: [LineKey; 3] = [REVENUE, CURRENT_ASSETS, CURRENT_LIABILITIES];

/// Reporting problems always evaluate: an empty filing is itself the finding.
pub(crate) fn reporting_problems(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M13;
    let set = input.statements;
    let year = input.year;

    let mut audit = Audit::new();
    for key in KEY_LINES {
        audit = audit.line(year, key, set.value(key, year));
    }

    let silent_year = KEY_LINES.iter().all(|key| set.value(*key, year).is_none());

    let balance = latest_year_with(set, [TOTAL_ASSETS, TOTAL_LIABILITIES], year);
    let unbalanced = balance.filter(|(_, [assets, liabilities])| !approx_eq(*assets, *liabilities));
    if let Some((balance_year, values)) = balance {
        audit = audit.lines(balance_year, [TOTAL_ASSETS, TOTAL_LIABILITIES], values);
    }

    let core_missing = |year: i32| CORE_LINES.iter().all(|key| set.value(*key, year).is_none());
    let gap = core_missing(year) && core_missing(year - 1);

    debug!(marker = code.label(), year, silent_year, unbalanced = unbalanced.is_some(), gap, "reporting problems");
    let audit = audit
        .note(
            "checks",
            json!({
                "no_reporting_in_year": silent_year,
                "balance_mismatch": unbalanced.is_some(),
                "core_lines_missing_two_years": gap,
            }),
        )
        .into_value();

    let mut reasons = Vec::new();
    if silent_year {
        reasons.push(format!("нет отчётности по ключевым строкам за {year}"));
    }
    if let Some((balance_year, [assets, liabilities])) = unbalanced {
        reasons.push(format!("актив 1600 ({assets}) ≠ пассив 1700 ({liabilities}) в {balance_year}"));
    }
    if gap {
        reasons.push(format!("строки 2110, 1200 и 1500 отсутствуют в {} и {year}", year - 1));
    }

    if reasons.is_empty() {
        MarkerResult::clear(code, "отчётность без явных проблем", audit)
    } else {
        MarkerResult::triggered(code, 3, reasons.join("; "), audit)
    }
}

pub(crate) fn structural_anomalies(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M18;
    let set = input.statements;
    let cap = input.year;
    let mut audit = Audit::new();
    let mut reasons = Vec::new();

    let inventory = latest_year_with(set, [CURRENT_ASSETS, INVENTORY], cap);
    if let Some((year, values)) = inventory {
        audit = audit.lines(year, [CURRENT_ASSETS, INVENTORY], values);
        if less_than(values[0], values[1]) {
            reasons.push(format!("оборотные активы меньше запасов в {year}"));
        }
    }

    let creditors = latest_year_with(set, [CURRENT_LIABILITIES, CREDITORS], cap);
    if let Some((year, values)) = creditors {
        audit = audit.lines(year, [CURRENT_LIABILITIES, CREDITORS], values);
        if less_than(values[0], values[1]) {
            reasons.push(format!("краткосрочные обязательства меньше кредиторки в {year}"));
        }
    }

    let mut saw_current_assets = false;
    for curr in ((cap - LOOKBACK_YEARS + 1)..=cap).rev() {
        let prev = curr - 1;
        let assets = [set.value(CURRENT_ASSETS, prev), set.value(CURRENT_ASSETS, curr)];
        saw_current_assets |= assets.iter().any(Option::is_some);
        let no_revenue = set.value(REVENUE, prev).is_none() && set.value(REVENUE, curr).is_none();
        let has_assets = assets.iter().flatten().any(|value| greater_than(*value, 0.0));
        if no_revenue && has_assets {
            audit = audit
                .line(prev, CURRENT_ASSETS, assets[0])
                .line(curr, CURRENT_ASSETS, assets[1]);
            reasons.push(format!("нет выручки в {prev} и {curr} при наличии оборотных активов"));
            break;
        }
    }

    debug!(marker = code.label(), anomalies = reasons.len(), "structural anomalies");

    if !reasons.is_empty() {
        return MarkerResult::triggered(code, 1, reasons.join("; "), audit.into_value());
    }
    if inventory.is_none() && creditors.is_none() && !saw_current_assets {
        return MarkerResult::not_applicable(
            code,
            "нет данных по строкам 1200, 1210, 1500 и 1520",
            audit.into_value(),
        );
    }
    MarkerResult::clear(code, "структурных несоответствий нет", audit.into_value())
}
