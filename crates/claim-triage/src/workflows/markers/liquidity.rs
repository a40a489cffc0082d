use tracing::debug;

use super::domain::{Audit, MarkerCode, MarkerResult, Severity};
use super::MarkerInput;
use crate::workflows::statements::lines::{
    CASH, CREDITORS, CURRENT_ASSETS, CURRENT_LIABILITIES, INVENTORY,
};
use crate::workflows::statements::thresholds::{less_than, ratio};
use crate::workflows::statements::latest_year_with;

const CURRENT_RATIO_LIMIT: f64 = 1.0;
const CURRENT_RATIO_CRITICAL: f64 = 0.7;
const QUICK_RATIO_LIMIT: f64 = 0.6;
const CASH_RATIO_LIMIT: f64 = 0.1;
const CASH_TO_CREDITORS_LIMIT: f64 = 0.1;

pub(crate) fn current_liquidity(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M2;
    let keys = [CURRENT_ASSETS, CURRENT_LIABILITIES];
    let Some((year, values)) = latest_year_with(input.statements, keys, input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет года с заполненными строками 1200 и 1500",
            Audit::new().into_value(),
        );
    };

    let [assets, liabilities] = values;
    let current = ratio(Some(assets), Some(liabilities));
    debug!(marker = code.label(), year, assets, liabilities, ?current, "current liquidity");

    let audit = Audit::new()
        .lines(year, keys, values)
        .metric(year, "current_ratio", current)
        .note("threshold", CURRENT_RATIO_LIMIT)
        .note("critical_below", CURRENT_RATIO_CRITICAL);

    let Some(current) = current else {
        return MarkerResult::not_applicable(
            code,
            format!("краткосрочные обязательства (1500) равны нулю в {year}"),
            audit.into_value(),
        );
    };

    let severity = if less_than(current, CURRENT_RATIO_CRITICAL) {
        Severity::Critical
    } else if less_than(current, CURRENT_RATIO_LIMIT) {
        Severity::Elevated
    } else {
        Severity::Normal
    };

    let result = if less_than(current, CURRENT_RATIO_LIMIT) {
        MarkerResult::triggered(
            code,
            2,
            format!("коэффициент текущей ликвидности {current:.2} < {CURRENT_RATIO_LIMIT:.1} в {year}"),
            audit.into_value(),
        )
    } else {
        MarkerResult::clear(
            code,
            format!("коэффициент текущей ликвидности {current:.2} в норме в {year}"),
            audit.into_value(),
        )
    };

    result.with_severity(severity)
}

pub(crate) fn quick_liquidity(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M3;
    let keys = [CURRENT_ASSETS, INVENTORY, CURRENT_LIABILITIES];
    let Some((year, values)) = latest_year_with(input.statements, keys, input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет года с заполненными строками 1200, 1210 и 1500",
            Audit::new().into_value(),
        );
    };

    let [assets, inventory, liabilities] = values;
    let quick = ratio(Some(assets - inventory), Some(liabilities));
    debug!(marker = code.label(), year, ?quick, "quick liquidity");

    let audit = Audit::new()
        .lines(year, keys, values)
        .metric(year, "quick_ratio", quick)
        .note("threshold", QUICK_RATIO_LIMIT);

    match quick {
        None => MarkerResult::not_applicable(
            code,
            format!("краткосрочные обязательства (1500) равны нулю в {year}"),
            audit.into_value(),
        ),
        Some(quick) if less_than(quick, QUICK_RATIO_LIMIT) => MarkerResult::triggered(
            code,
            2,
            format!("коэффициент быстрой ликвидности {quick:.2} < {QUICK_RATIO_LIMIT} в {year}"),
            audit.into_value(),
        ),
        Some(quick) => MarkerResult::clear(
            code,
            format!("коэффициент быстрой ликвидности {quick:.2} в норме в {year}"),
            audit.into_value(),
        ),
    }
}

pub(crate) fn absolute_liquidity(input: &MarkerInput<'_>) -> MarkerResult {
    cash_cover(
        input,
        MarkerCode::M4,
        CURRENT_LIABILITIES,
        CASH_RATIO_LIMIT,
        "коэффициент абсолютной ликвидности",
    )
}

pub(crate) fn cash_to_creditors(input: &MarkerInput<'_>) -> MarkerResult {
    cash_cover(
        input,
        MarkerCode::M9,
        CREDITORS,
        CASH_TO_CREDITORS_LIMIT,
        "отношение денежных средств к кредиторской задолженности",
    )
}

fn cash_cover(
    input: &MarkerInput<'_>,
    code: MarkerCode,
    denominator: crate::workflows::statements::LineKey,
    limit: f64,
    label: &str,
) -> MarkerResult {
    let keys = [CASH, denominator];
    let Some((year, values)) = latest_year_with(input.statements, keys, input.year) else {
        return MarkerResult::not_applicable(
            code,
            format!("нет года с заполненными строками 1250 и {}", denominator.code),
            Audit::new().into_value(),
        );
    };

    let [cash, owed] = values;
    let cover = ratio(Some(cash), Some(owed));
    debug!(marker = code.label(), year, cash, owed, ?cover, "cash cover");

    let audit = Audit::new()
        .lines(year, keys, values)
        .metric(year, "ratio", cover)
        .note("threshold", limit);

    match cover {
        None => MarkerResult::not_applicable(
            code,
            format!("строка {} равна нулю в {year}", denominator.code),
            audit.into_value(),
        ),
        Some(cover) if less_than(cover, limit) => MarkerResult::triggered(
            code,
            2,
            format!("{label} {cover:.3} < {limit} в {year}"),
            audit.into_value(),
        ),
        Some(cover) => MarkerResult::clear(
            code,
            format!("{label} {cover:.3} в норме в {year}"),
            audit.into_value(),
        ),
    }
}
