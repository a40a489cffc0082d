use tracing::debug;

use super::domain::{Audit, MarkerCode, MarkerResult};
use super::MarkerInput;
use crate::workflows::statements::lines::{
    CREDITORS, CURRENT_ASSETS, INVENTORY, RECEIVABLES, REVENUE,
};
use crate::workflows::statements::thresholds::{
    greater_or_equal, greater_than, less_or_equal, less_than, pct_change, ratio,
};
use crate::workflows::statements::{latest_pair_with, lookback_years, StatementSet, YearPair};

const RECEIVABLES_TO_REVENUE_LIMIT: f64 = 1.0;
const DAYS_IN_YEAR: f64 = 365.0;
const DSO_ALARM_DAYS: f64 = 240.0;
const CREDITORS_SURGE: f64 = 0.5;
const REVENUE_COLLAPSE: f64 = -0.3;
const INVENTORY_SURGE: f64 = 0.30;
const REVENUE_DECLINE: f64 = -0.20;
const INVENTORY_TO_REVENUE_ALARM: f64 = 0.5;
const CREDITORS_GROWTH: f64 = 0.30;

/// Creditor and revenue movement over the newest usable pair, shared with the composite marker.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CreditorRevenueShift {
    pub(crate) pair: YearPair<2>,
    pub(crate) creditors_change: Option<f64>,
    pub(crate) revenue_change: Option<f64>,
}

impl CreditorRevenueShift {
    pub(crate) fn is_computable(&self) -> bool {
        self.creditors_change.is_some() && self.revenue_change.is_some()
    }

    pub(crate) fn triggered(&self) -> bool {
        match (self.creditors_change, self.revenue_change) {
            (Some(creditors), Some(revenue)) => {
                greater_or_equal(creditors, CREDITORS_SURGE)
                    && less_or_equal(revenue, REVENUE_COLLAPSE)
            }
            _ => false,
        }
    }
}

pub(crate) fn creditor_revenue_shift(set: &StatementSet, cap: i32) -> Option<CreditorRevenueShift> {
    let pair = latest_pair_with(set, [CREDITORS, REVENUE], cap)?;
    let [prev_creditors, prev_revenue] = pair.prev_values;
    let [curr_creditors, curr_revenue] = pair.curr_values;
    let revenue_change = if greater_than(prev_revenue, 0.0) {
        pct_change(prev_revenue, curr_revenue)
    } else {
        None
    };

    Some(CreditorRevenueShift {
        pair,
        creditors_change: pct_change(prev_creditors, curr_creditors),
        revenue_change,
    })
}

pub(crate) fn frozen_receivables(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M7;
    let set = input.statements;
    let receivables_share = |year: i32| -> Option<f64> {
        let revenue = set.value(REVENUE, year).filter(|revenue| greater_than(*revenue, 0.0))?;
        ratio(set.value(RECEIVABLES, year), Some(revenue))
    };

    let mut audit = Audit::new()
        .note("threshold", RECEIVABLES_TO_REVENUE_LIMIT)
        .note("dso_alarm_days", DSO_ALARM_DAYS);

    let years: Vec<i32> = lookback_years(set, input.year).into_iter().take(3).collect();
    if let &[latest, middle, oldest] = years.as_slice() {
        let trend = [oldest, middle, latest].map(|year| receivables_share(year).map(|r| (year, r)));
        if let [Some((y0, r0)), Some((y1, r1)), Some((y2, r2))] = trend {
            debug!(marker = code.label(), r0, r1, r2, "receivables trend over three years");
            if less_than(r0, r1) && less_than(r1, r2) && greater_than(r2, RECEIVABLES_TO_REVENUE_LIMIT) {
                for (year, share) in [(y0, r0), (y1, r1), (y2, r2)] {
                    audit = audit
                        .line(year, RECEIVABLES, set.value(RECEIVABLES, year))
                        .line(year, REVENUE, set.value(REVENUE, year))
                        .metric(year, "receivables_to_revenue", Some(share))
                        .metric(year, "dso", Some(DAYS_IN_YEAR * share));
                }
                let strengthening = greater_than(DAYS_IN_YEAR * r2, DSO_ALARM_DAYS)
                    && greater_than(r2, r1);
                return MarkerResult::triggered(
                    code,
                    2,
                    format!("1230/2110 растёт три года подряд ({r0:.2} → {r1:.2} → {r2:.2}) и превышает 1"),
                    audit.note("dso_strengthening", strengthening).into_value(),
                );
            }
        }
    }

    let Some(pair) = latest_pair_with(set, [RECEIVABLES, REVENUE], input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет пары лет с заполненными строками 1230 и 2110",
            audit.into_value(),
        );
    };

    audit = audit
        .lines(pair.prev, [RECEIVABLES, REVENUE], pair.prev_values)
        .lines(pair.curr, [RECEIVABLES, REVENUE], pair.curr_values);
    let (Some(r_prev), Some(r_curr)) = (receivables_share(pair.prev), receivables_share(pair.curr))
    else {
        return MarkerResult::not_applicable(
            code,
            format!("выручка неположительна в {} или {}", pair.prev, pair.curr),
            audit.into_value(),
        );
    };

    let (dso_prev, dso_curr) = (DAYS_IN_YEAR * r_prev, DAYS_IN_YEAR * r_curr);
    debug!(marker = code.label(), prev_year = pair.prev, year = pair.curr, r_prev, r_curr, dso_curr, "receivables pair");
    audit = audit
        .metric(pair.prev, "receivables_to_revenue", Some(r_prev))
        .metric(pair.curr, "receivables_to_revenue", Some(r_curr))
        .metric(pair.prev, "dso", Some(dso_prev))
        .metric(pair.curr, "dso", Some(dso_curr));

    if greater_than(r_curr, RECEIVABLES_TO_REVENUE_LIMIT) && greater_than(r_curr, r_prev) {
        let strengthening = greater_than(dso_curr, DSO_ALARM_DAYS) && greater_than(dso_curr, dso_prev);
        MarkerResult::triggered(
            code,
            2,
            format!("1230/2110 вырос с {r_prev:.2} до {r_curr:.2} ({}→{})", pair.prev, pair.curr),
            audit.note("dso_strengthening", strengthening).into_value(),
        )
    } else {
        MarkerResult::clear(
            code,
            format!("1230/2110 = {r_curr:.2} в {} без признаков застывания", pair.curr),
            audit.into_value(),
        )
    }
}

pub(crate) fn creditors_up_revenue_down(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M8;
    let Some(shift) = creditor_revenue_shift(input.statements, input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет пары лет с заполненными строками 1520 и 2110",
            Audit::new().into_value(),
        );
    };

    let pair = shift.pair;
    debug!(
        marker = code.label(),
        prev_year = pair.prev,
        year = pair.curr,
        creditors_change = ?shift.creditors_change,
        revenue_change = ?shift.revenue_change,
        "creditors vs revenue"
    );
    let audit = Audit::new()
        .lines(pair.prev, [CREDITORS, REVENUE], pair.prev_values)
        .lines(pair.curr, [CREDITORS, REVENUE], pair.curr_values)
        .metric(pair.curr, "creditors_change", shift.creditors_change)
        .metric(pair.curr, "revenue_change", shift.revenue_change)
        .into_value();

    if !shift.is_computable() {
        return MarkerResult::not_applicable(
            code,
            format!("нулевая или неположительная база в {}", pair.prev),
            audit,
        );
    }
    if shift.triggered() {
        MarkerResult::triggered(
            code,
            2,
            format!("кредиторка +50% и более при падении выручки на 30% и более ({}→{})", pair.prev, pair.curr),
            audit,
        )
    } else {
        MarkerResult::clear(code, format!("динамика {}→{} без резкого расхождения", pair.prev, pair.curr), audit)
    }
}

pub(crate) fn inventory_up_revenue_down(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M11;
    let keys = [INVENTORY, REVENUE];
    let Some(pair) = latest_pair_with(input.statements, keys, input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет пары лет с заполненными строками 1210 и 2110",
            Audit::new().into_value(),
        );
    };

    let [prev_inventory, prev_revenue] = pair.prev_values;
    let [curr_inventory, curr_revenue] = pair.curr_values;
    let inventory_change = pct_change(prev_inventory, curr_inventory);
    let revenue_change = pct_change(prev_revenue, curr_revenue);
    let share = ratio(Some(curr_inventory), Some(curr_revenue));
    debug!(marker = code.label(), ?inventory_change, ?revenue_change, ?share, "inventory vs revenue");

    let audit = Audit::new()
        .lines(pair.prev, keys, pair.prev_values)
        .lines(pair.curr, keys, pair.curr_values)
        .metric(pair.curr, "inventory_change", inventory_change)
        .metric(pair.curr, "revenue_change", revenue_change)
        .metric(pair.curr, "inventory_to_revenue", share);

    let (Some(inventory_change), Some(revenue_change)) = (inventory_change, revenue_change) else {
        return MarkerResult::not_applicable(
            code,
            format!("нулевая база для расчёта динамики в {}", pair.prev),
            audit.into_value(),
        );
    };

    if greater_or_equal(inventory_change, INVENTORY_SURGE) && less_or_equal(revenue_change, REVENUE_DECLINE) {
        let strengthening = share.is_some_and(|share| greater_than(share, INVENTORY_TO_REVENUE_ALARM));
        MarkerResult::triggered(
            code,
            2,
            format!(
                "запасы {:+.0}% при выручке {:+.0}% ({}→{})",
                inventory_change * 100.0,
                revenue_change * 100.0,
                pair.prev,
                pair.curr
            ),
            audit.note("share_strengthening", strengthening).into_value(),
        )
    } else {
        MarkerResult::clear(
            code,
            format!("запасы и выручка без расхождения ({}→{})", pair.prev, pair.curr),
            audit.into_value(),
        )
    }
}

pub(crate) fn current_assets_flat_creditors_up(input: &MarkerInput<'_>) -> MarkerResult {
    let code = MarkerCode::M17;
    let keys = [CURRENT_ASSETS, CREDITORS];
    let Some(pair) = latest_pair_with(input.statements, keys, input.year) else {
        return MarkerResult::not_applicable(
            code,
            "нет пары лет с заполненными строками 1200 и 1520",
            Audit::new().into_value(),
        );
    };

    let [prev_assets, prev_creditors] = pair.prev_values;
    let [curr_assets, curr_creditors] = pair.curr_values;
    let creditors_change = pct_change(prev_creditors, curr_creditors);
    debug!(marker = code.label(), prev_assets, curr_assets, ?creditors_change, "current assets vs creditors");

    let audit = Audit::new()
        .lines(pair.prev, keys, pair.prev_values)
        .lines(pair.curr, keys, pair.curr_values)
        .metric(pair.curr, "creditors_change", creditors_change)
        .into_value();

    let Some(creditors_change) = creditors_change else {
        return MarkerResult::not_applicable(
            code,
            format!("кредиторская задолженность равна нулю в {}", pair.prev),
            audit,
        );
    };

    if less_or_equal(curr_assets, prev_assets) && greater_or_equal(creditors_change, CREDITORS_GROWTH) {
        MarkerResult::triggered(
            code,
            2,
            format!(
                "оборотные активы не выросли, кредиторка {:+.0}% ({}→{})",
                creditors_change * 100.0,
                pair.prev,
                pair.curr
            ),
            audit,
        )
    } else {
        MarkerResult::clear(code, format!("динамика {}→{} в норме", pair.prev, pair.curr), audit)
    }
}
