use serde_json::json;
use tracing::debug;

use super::domain::{Audit, MarkerCode, MarkerResult};
use super::dynamics::creditor_revenue_shift;
use super::MarkerInput;
use crate::workflows::statements::lines::{
    CASH, CURRENT_ASSETS, CURRENT_LIABILITIES, EQUITY, INTEREST_PAID, INVENTORY, LONG_TERM_DEBT,
    REVENUE, SALES_PROFIT, SHORT_TERM_DEBT,
};
use crate::workflows::statements::thresholds::{greater_than, less_than, ratio};
use crate::workflows::statements::{latest_pair_with, latest_year_with, StatementSet};

const LEVERAGE_LIMIT: f64 = 2.0;
const INTEREST_COVER_LIMIT: f64 = 1.0;
const DISTRESSED_CURRENT_RATIO: f64 = 0.7;
const QUICK_RATIO_LIMIT: f64 = 0.6;
const CASH_RATIO_LIMIT: f64 = 0.1;

pub(crate) fn negative_equity(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M1;

    if let Some(pair) = latest_pair_with(input.statements, [EQUITY], input.year) {
        let ([prev], [curr]) = (pair.prev_values, pair.curr_values);
        debug!(marker = code.label(), prev_year = pair.prev, year = pair.curr, prev, curr, "equity pair");
        let audit = Audit::new()
            .line(pair.prev, EQUITY, Some(prev))
            .line(pair.curr, EQUITY, Some(curr))
            .into_value();

        return match (less_than(prev, 0.0), less_than(curr, 0.0)) {
            (true, true) => MarkerResult::triggered(
                code,
                3,
                format!("собственный капитал отрицателен второй год подряд ({} и {})", pair.prev, pair.curr),
                audit,
            ),
            (false, true) => MarkerResult::triggered(
                code,
                2,
                format!("собственный капитал отрицателен в {}", pair.curr),
                audit,
            ),
            _ => MarkerResult::clear(
                code,
                format!("собственный капитал неотрицателен в {}", pair.curr),
                audit,
            ),
        };
    }

    match latest_year_with(input.statements, [EQUITY], input.year) {
        Some((year, [equity])) => {
            debug!(marker = code.label(), year, equity, "equity single year");
            let audit = Audit::new().line(year, EQUITY, Some(equity)).into_value();
            if less_than(equity, 0.0) {
                MarkerResult::triggered(code, 2, format!("собственный капитал отрицателен в {year}"), audit)
            } else {
                MarkerResult::clear(code, format!("собственный капитал неотрицателен в {year}"), audit)
            }
        }
        None => MarkerResult::not_applicable(
            code,
            "нет данных по строке 1300",
            Audit::new().into_value(),
        ),
    }
}

pub(crate) fn debt_load(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M10;
    let mut audit = Audit::new()
        .note("leverage_threshold", LEVERAGE_LIMIT)
        .note("interest_cover_threshold", INTEREST_COVER_LIMIT);

    let leverage = leverage(input.statements, input.year);
    if let Some((year, values, value)) = leverage {
        audit = audit
            .lines(year, [LONG_TERM_DEBT, SHORT_TERM_DEBT, REVENUE], values)
            .metric(year, "leverage", value);
    }

    let cover = latest_year_with(input.statements, [SALES_PROFIT, INTEREST_PAID], input.year).map(
        |(year, values)| {
            let [profit, interest] = values;
            // Cover is only meaningful when interest was actually paid.
            let cover = if greater_than(interest, 0.0) {
                ratio(Some(profit), Some(interest))
            } else {
                None
            };
            (year, values, cover)
        },
    );
    if let Some((year, values, value)) = cover {
        audit = audit
            .lines(year, [SALES_PROFIT, INTEREST_PAID], values)
            .metric(year, "interest_cover", value);
    }

    let leverage = leverage.and_then(|(year, _, value)| value.map(|value| (year, value)));
    let cover = cover.and_then(|(year, _, value)| value.map(|value| (year, value)));
    debug!(marker = code.label(), ?leverage, ?cover, "debt load");

    if let Some((year, value)) = leverage.filter(|(_, value)| greater_than(*value, LEVERAGE_LIMIT)) {
        return MarkerResult::triggered(
            code,
            2,
            format!("долговая нагрузка (1410+1510)/2110 = {value:.2} > {LEVERAGE_LIMIT} в {year}"),
            audit.into_value(),
        );
    }
    if let Some((year, value)) = cover.filter(|(_, value)| less_than(*value, INTEREST_COVER_LIMIT)) {
        return MarkerResult::triggered(
            code,
            2,
            format!("покрытие процентов 2200/2330 = {value:.2} < {INTEREST_COVER_LIMIT} в {year}"),
            audit.into_value(),
        );
    }

    if leverage.is_none() && cover.is_none() {
        return MarkerResult::not_applicable(
            code,
            "нет данных для расчёта долговой нагрузки и покрытия процентов",
            audit.into_value(),
        );
    }

    MarkerResult::clear(
        code,
        "долговая нагрузка и покрытие процентов в норме",
        audit.into_value(),
    )
}

pub(crate) fn bankruptcy_obligation(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M14;
    let set = input.statements;
    let cap = input.year;

    // S1: negative equity together with a distressed current ratio in the same year.
    let s1 = latest_year_with(set, [EQUITY, CURRENT_ASSETS, CURRENT_LIABILITIES], cap).and_then(
        |(year, [equity, assets, liabilities])| {
            ratio(Some(assets), Some(liabilities)).map(|current| {
                let hit = less_than(equity, 0.0) && less_than(current, DISTRESSED_CURRENT_RATIO);
                (year, equity, current, hit)
            })
        },
    );

    // S2: weak quick liquidity and heavy debt relative to revenue.
    let quick = latest_year_with(set, [CURRENT_ASSETS, INVENTORY, CURRENT_LIABILITIES], cap)
        .and_then(|(year, [assets, inventory, liabilities])| {
            ratio(Some(assets - inventory), Some(liabilities)).map(|value| (year, value))
        });
    let s2 = quick.zip(leverage(set, cap).and_then(|(year, _, value)| value.map(|value| (year, value))))
        .map(|(quick, leverage)| {
            let hit = less_than(quick.1, QUICK_RATIO_LIMIT) && greater_than(leverage.1, LEVERAGE_LIMIT);
            (quick, leverage, hit)
        });

    // S3: almost no cash while creditors jump and revenue collapses.
    let cash = latest_year_with(set, [CASH, CURRENT_LIABILITIES], cap).and_then(
        |(year, [cash, liabilities])| ratio(Some(cash), Some(liabilities)).map(|value| (year, value)),
    );
    let shift = creditor_revenue_shift(set, cap);
    let s3 = cash.zip(shift.as_ref().and_then(|shift| shift.is_computable().then_some(shift)))
        .map(|(cash, shift)| {
            let hit = less_than(cash.1, CASH_RATIO_LIMIT) && shift.triggered();
            (cash, shift, hit)
        });

    debug!(
        marker = code.label(),
        s1 = ?s1.map(|s| s.3),
        s2 = ?s2.map(|s| s.2),
        s3 = ?s3.as_ref().map(|s| s.2),
        "bankruptcy obligation scenarios"
    );

    let mut audit = Audit::new();
    if let Some((year, equity, current, hit)) = s1 {
        audit = audit
            .line(year, EQUITY, Some(equity))
            .metric(year, "current_ratio", Some(current))
            .note("s1", json!({ "year": year, "triggered": hit }));
    }
    if let Some(((quick_year, quick), (leverage_year, leverage), hit)) = s2 {
        audit = audit
            .metric(quick_year, "quick_ratio", Some(quick))
            .metric(leverage_year, "leverage", Some(leverage))
            .note("s2", json!({ "quick_year": quick_year, "leverage_year": leverage_year, "triggered": hit }));
    }
    if let Some(((year, cash_ratio), shift, hit)) = &s3 {
        audit = audit
            .metric(*year, "cash_ratio", Some(*cash_ratio))
            .note(
                "s3",
                json!({
                    "year": year,
                    "pair": [shift.pair.prev, shift.pair.curr],
                    "creditors_change": shift.creditors_change,
                    "revenue_change": shift.revenue_change,
                    "triggered": hit,
                }),
            );
    }

    let mut fired = Vec::new();
    if s1.is_some_and(|s| s.3) {
        fired.push("S1: капитал < 0 и 1200/1500 < 0.7");
    }
    if s2.is_some_and(|s| s.2) {
        fired.push("S2: быстрая ликвидность < 0.6 и долг/выручка > 2");
    }
    if s3.as_ref().is_some_and(|s| s.2) {
        fired.push("S3: 1250/1500 < 0.1 при росте кредиторки и падении выручки");
    }

    if !fired.is_empty() {
        return MarkerResult::triggered(code, 3, fired.join("; "), audit.into_value());
    }
    if s1.is_none() && s2.is_none() && s3.is_none() {
        return MarkerResult::not_applicable(
            code,
            "недостаточно данных ни для одного сценария",
            audit.into_value(),
        );
    }
    MarkerResult::clear(code, "ни один сценарий не выполнен", audit.into_value())
}

/// Latest `(1410 + 1510) / 2110` in the lookback window.
fn leverage(set: &StatementSet, cap: i32) -> Option<(i32, [f64; 3], Option<f64>)> {
    latest_year_with(set, [LONG_TERM_DEBT, SHORT_TERM_DEBT, REVENUE], cap).map(|(year, values)| {
        let [long_term, short_term, revenue] = values;
        (year, values, ratio(Some(long_term + short_term), Some(revenue)))
    })
}
