use tracing::debug;

use super::domain::{Audit, MarkerCode, MarkerResult};
use super::registry::tax_collapsed;
use super::MarkerInput;
use crate::workflows::statements::lines::{
    FIXED_ASSETS, LONG_TERM_INVESTMENTS, REVENUE, SHORT_TERM_INVESTMENTS, TOTAL_ASSETS,
};
use crate::workflows::statements::thresholds::{
    approx_eq, greater_or_equal, less_or_equal, pct_change, ratio,
};
use crate::workflows::statements::{latest_pair_with, lookback_years};

const FIXED_ASSET_DROP: f64 = -0.25;
const LONG_TERM_SHARE_LIMIT: f64 = 0.20;
const LONG_TERM_SHARE_GROWTH: f64 = 0.10;
const ASSET_SHIFT_SHARE: f64 = 0.25;
const FIXED_SHARE_DROP: f64 = -0.15;
const SHORT_TERM_GROWTH: f64 = 0.50;
const SHORT_TERM_SHARE_LIMIT: f64 = 0.15;
const SHORT_TERM_SHARE_GROWTH: f64 = 0.08;

pub(crate) fn fixed_asset_drop(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M5;
    let Some(pair) = latest_pair_with(input.statements, [FIXED_ASSETS], input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет пары лет с заполненной строкой 1150",
            Audit::new().into_value(),
        );
    };

    let ([prev], [curr]) = (pair.prev_values, pair.curr_values);
    let change = pct_change(prev, curr);
    debug!(marker = code.label(), prev_year = pair.prev, year = pair.curr, prev, curr, ?change, "fixed assets");

    let audit = Audit::new()
        .line(pair.prev, FIXED_ASSETS, Some(prev))
        .line(pair.curr, FIXED_ASSETS, Some(curr))
        .metric(pair.curr, "change", change)
        .note("threshold", FIXED_ASSET_DROP)
        .into_value();

    match change {
        None => MarkerResult::not_applicable(
            code,
            format!("основные средства равны нулю в {}", pair.prev),
            audit,
        ),
        Some(change) if less_or_equal(change, FIXED_ASSET_DROP) => MarkerResult::triggered(
            code,
            2,
            format!("основные средства сократились на {:.0}% ({}→{})", -change * 100.0, pair.prev, pair.curr),
            audit,
        ),
        Some(change) => MarkerResult::clear(
            code,
            format!("изменение основных средств {:+.0}% ({}→{})", change * 100.0, pair.prev, pair.curr),
            audit,
        ),
    }
}

pub(crate) fn long_term_investment_shift(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M6;
    let keys = [LONG_TERM_INVESTMENTS, TOTAL_ASSETS];
    let Some(pair) = latest_pair_with(input.statements, keys, input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет пары лет с заполненными строками 1170 и 1600",
            Audit::new().into_value(),
        );
    };

    let share_prev = ratio(Some(pair.prev_values[0]), Some(pair.prev_values[1]));
    let share_curr = ratio(Some(pair.curr_values[0]), Some(pair.curr_values[1]));
    debug!(marker = code.label(), ?share_prev, ?share_curr, "long-term investment share");

    let audit = Audit::new()
        .lines(pair.prev, keys, pair.prev_values)
        .lines(pair.curr, keys, pair.curr_values)
        .metric(pair.prev, "share", share_prev)
        .metric(pair.curr, "share", share_curr)
        .into_value();

    let (Some(share_prev), Some(share_curr)) = (share_prev, share_curr) else {
        return MarkerResult::not_applicable(code, "валюта баланса равна нулю", audit);
    };

    let growth = share_curr - share_prev;
    if greater_or_equal(share_curr, LONG_TERM_SHARE_LIMIT) && greater_or_equal(growth, LONG_TERM_SHARE_GROWTH) {
        MarkerResult::triggered(
            code,
            2,
            format!(
                "доля 1170 в активах {:.0}% (+{:.0} п.п.) в {}",
                share_curr * 100.0,
                growth * 100.0,
                pair.curr
            ),
            audit,
        )
    } else {
        MarkerResult::clear(
            code,
            format!("доля 1170 в активах {:.0}% в {}", share_curr * 100.0, pair.curr),
            audit,
        )
    }
}

pub(crate) fn large_asset_shifts(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M12;
    let keys = [FIXED_ASSETS, LONG_TERM_INVESTMENTS, SHORT_TERM_INVESTMENTS, TOTAL_ASSETS];
    let Some(pair) = latest_pair_with(input.statements, keys, input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет пары лет с заполненными строками 1150, 1170, 1240 и 1600",
            Audit::new().into_value(),
        );
    };

    let prev_total = pair.prev_values[3];
    let audit = Audit::new()
        .lines(pair.prev, keys, pair.prev_values)
        .lines(pair.curr, keys, pair.curr_values);
    if approx_eq(prev_total, 0.0) {
        return MarkerResult::not_applicable(
            code,
            format!("валюта баланса равна нулю в {}", pair.prev),
            audit.into_value(),
        );
    }

    let limit = ASSET_SHIFT_SHARE * prev_total.abs();
    let shifts: Vec<(u16, f64)> = keys[..3]
        .iter()
        .enumerate()
        .map(|(idx, key)| (key.code, (pair.curr_values[idx] - pair.prev_values[idx]).abs()))
        .collect();
    let moved: Vec<u16> = shifts
        .iter()
        .filter(|(_, delta)| greater_or_equal(*delta, limit))
        .map(|(line, _)| *line)
        .collect();

    let property_tax = input
        .signals
        .and_then(|signals| tax_collapsed(&signals.property_tax, pair.prev, pair.curr));
    debug!(marker = code.label(), limit, ?shifts, ?property_tax, "asset structure shifts");

    let mut audit = audit
        .note("limit", limit)
        .note("property_tax_collapsed", property_tax);
    for (line, delta) in &shifts {
        audit = audit.metric(pair.curr, &format!("abs_delta_{line}"), Some(*delta));
    }

    if moved.is_empty() {
        return MarkerResult::clear(
            code,
            format!("структура активов стабильна ({}→{})", pair.prev, pair.curr),
            audit.into_value(),
        );
    }

    let lines = moved
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if property_tax == Some(true) {
        MarkerResult::triggered(
            code,
            3,
            format!("сдвиг строк {lines} ≥ 25% валюты баланса и падение налога на имущество на 90%+"),
            audit.into_value(),
        )
    } else {
        MarkerResult::triggered(
            code,
            2,
            format!("сдвиг строк {lines} ≥ 25% валюты баланса {}", pair.prev),
            audit.into_value(),
        )
    }
}

pub(crate) fn fixed_asset_share_drop(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M15;
    let set = input.statements;
    let years = lookback_years(set, input.year);

    // Newest run of three adjacent available years with shares for the last two and revenue for all.
    let window = years.windows(3).find_map(|window| {
        let (latest, middle, oldest) = (window[0], window[1], window[2]);
        let share = |year| ratio(set.value(FIXED_ASSETS, year), set.value(TOTAL_ASSETS, year));
        Some((
            [oldest, middle, latest],
            [share(middle)?, share(latest)?],
            [
                set.value(REVENUE, oldest)?,
                set.value(REVENUE, middle)?,
                set.value(REVENUE, latest)?,
            ],
        ))
    });

    let Some(([oldest, middle, latest], [share_prev, share_curr], revenue)) = window else {
        return MarkerResult::not_applicable(
            code,
            "нужны три года с долей 1150/1600 и выручкой 2110",
            Audit::new().into_value(),
        );
    };

    let change = share_curr - share_prev;
    let revenue_flat = less_or_equal(revenue[1], revenue[0]) && less_or_equal(revenue[2], revenue[1]);
    debug!(marker = code.label(), share_prev, share_curr, ?revenue, revenue_flat, "fixed asset share");

    let audit = Audit::new()
        .line(oldest, REVENUE, Some(revenue[0]))
        .line(middle, REVENUE, Some(revenue[1]))
        .line(latest, REVENUE, Some(revenue[2]))
        .metric(middle, "fixed_asset_share", Some(share_prev))
        .metric(latest, "fixed_asset_share", Some(share_curr))
        .note("threshold_pp", FIXED_SHARE_DROP)
        .into_value();

    if less_or_equal(change, FIXED_SHARE_DROP) && revenue_flat {
        MarkerResult::triggered(
            code,
            2,
            format!(
                "доля основных средств упала на {:.0} п.п. ({middle}→{latest}) при невозрастающей выручке",
                -change * 100.0
            ),
            audit,
        )
    } else {
        MarkerResult::clear(
            code,
            format!("доля основных средств изменилась на {:+.0} п.п.", change * 100.0),
            audit,
        )
    }
}

pub(crate) fn short_term_investment_growth(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M16;
    let keys = [SHORT_TERM_INVESTMENTS, TOTAL_ASSETS];
    let Some(pair) = latest_pair_with(input.statements, keys, input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет пары лет с заполненными строками 1240 и 1600",
            Audit::new().into_value(),
        );
    };

    let growth = pct_change(pair.prev_values[0], pair.curr_values[0]);
    let share_prev = ratio(Some(pair.prev_values[0]), Some(pair.prev_values[1]));
    let share_curr = ratio(Some(pair.curr_values[0]), Some(pair.curr_values[1]));
    debug!(marker = code.label(), ?growth, ?share_prev, ?share_curr, "short-term investments");

    let audit = Audit::new()
        .lines(pair.prev, keys, pair.prev_values)
        .lines(pair.curr, keys, pair.curr_values)
        .metric(pair.curr, "growth", growth)
        .metric(pair.prev, "share", share_prev)
        .metric(pair.curr, "share", share_curr)
        .into_value();

    if let Some(growth) = growth.filter(|growth| greater_or_equal(*growth, SHORT_TERM_GROWTH)) {
        return MarkerResult::triggered(
            code,
            2,
            format!("краткосрочные вложения выросли на {:.0}% ({}→{})", growth * 100.0, pair.prev, pair.curr),
            audit,
        );
    }

    if let (Some(prev), Some(curr)) = (share_prev, share_curr) {
        if greater_or_equal(curr, SHORT_TERM_SHARE_LIMIT) && greater_or_equal(curr - prev, SHORT_TERM_SHARE_GROWTH) {
            return MarkerResult::triggered(
                code,
                2,
                format!(
                    "доля 1240 в активах {:.0}% (+{:.0} п.п.) в {}",
                    curr * 100.0,
                    (curr - prev) * 100.0,
                    pair.curr
                ),
                audit,
            );
        }
    }

    if growth.is_none() && (share_prev.is_none() || share_curr.is_none()) {
        return MarkerResult::not_applicable(code, "нулевая база для расчёта", audit);
    }

    MarkerResult::clear(
        code,
        format!("краткосрочные вложения без резкого роста ({}→{})", pair.prev, pair.curr),
        audit,
    )
}
