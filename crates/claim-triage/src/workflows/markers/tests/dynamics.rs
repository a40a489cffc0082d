use super::common::*;
use crate::workflows::markers::MarkerCode;
use crate::workflows::statements::lines::{
    CREDITORS, CURRENT_ASSETS, FIXED_ASSETS, INVENTORY, LONG_TERM_INVESTMENTS, RECEIVABLES,
    REVENUE, SHORT_TERM_INVESTMENTS, TOTAL_ASSETS,
};

#[test]
fn fixed_assets_falling_a_quarter_trigger() {
    let set = trailing(statements(), FIXED_ASSETS, &[100.0, 75.0]).build();
    assert_points(&run(MarkerCode::M5, &set), 2);

    let mild = trailing(statements(), FIXED_ASSETS, &[100.0, 80.0]).build();
    assert_points(&run(MarkerCode::M5, &mild), 0);

    let zero_base = trailing(statements(), FIXED_ASSETS, &[0.0, 80.0]).build();
    assert_not_applicable(&run(MarkerCode::M5, &zero_base));
}

#[test]
fn long_term_investment_share_jump() {
    let builder = trailing(statements(), LONG_TERM_INVESTMENTS, &[10.0, 25.0]);
    let set = trailing(builder, TOTAL_ASSETS, &[100.0, 100.0]).build();

    assert_points(&run(MarkerCode::M6, &set), 2);
}

#[test]
fn receivables_rising_three_years_trigger_with_dso_note() {
    let builder = trailing(statements(), RECEIVABLES, &[80.0, 110.0, 150.0]);
    let set = trailing(builder, REVENUE, &[100.0, 100.0, 100.0]).build();

    let result = run(MarkerCode::M7, &set);

    assert_points(&result, 2);
    assert_eq!(result.values["dso_strengthening"], true);
    assert_eq!(result.values["2024"]["dso"], 547.5);
}

#[test]
fn receivables_pair_fallback_and_non_positive_revenue() {
    let builder = trailing(statements(), RECEIVABLES, &[110.0, 150.0]);
    let set = trailing(builder, REVENUE, &[100.0, 100.0]).build();
    assert_points(&run(MarkerCode::M7, &set), 2);

    let builder = trailing(statements(), RECEIVABLES, &[110.0, 150.0]);
    let no_sales = trailing(builder, REVENUE, &[0.0, 0.0]).build();
    assert_not_applicable(&run(MarkerCode::M7, &no_sales));
}

#[test]
fn creditors_surge_with_revenue_collapse() {
    let builder = trailing(statements(), CREDITORS, &[100.0, 150.0]);
    let set = trailing(builder, REVENUE, &[1_000.0, 700.0]).build();
    assert_points(&run(MarkerCode::M8, &set), 2);

    let builder = trailing(statements(), CREDITORS, &[100.0, 140.0]);
    let calm = trailing(builder, REVENUE, &[1_000.0, 700.0]).build();
    assert_points(&run(MarkerCode::M8, &calm), 0);
}

#[test]
fn inventory_growth_against_falling_revenue() {
    let builder = trailing(statements(), INVENTORY, &[100.0, 130.0]);
    let set = trailing(builder, REVENUE, &[1_000.0, 800.0]).build();

    let result = run(MarkerCode::M11, &set);

    assert_points(&result, 2);
    assert_eq!(result.values["share_strengthening"], false);
}

#[test]
fn fixed_asset_share_drop_needs_three_years() {
    let builder = trailing(statements(), FIXED_ASSETS, &[60.0, 50.0, 30.0]);
    let builder = trailing(builder, TOTAL_ASSETS, &[100.0, 100.0, 100.0]);
    let set = trailing(builder, REVENUE, &[100.0, 90.0, 90.0]).build();
    assert_points(&run(MarkerCode::M15, &set), 2);

    let builder = trailing(statements(), FIXED_ASSETS, &[50.0, 30.0]);
    let builder = trailing(builder, TOTAL_ASSETS, &[100.0, 100.0]);
    let two_years = trailing(builder, REVENUE, &[90.0, 90.0]).build();
    assert_not_applicable(&run(MarkerCode::M15, &two_years));

    let builder = trailing(statements(), FIXED_ASSETS, &[60.0, 50.0, 30.0]);
    let builder = trailing(builder, TOTAL_ASSETS, &[100.0, 100.0, 100.0]);
    let growing = trailing(builder, REVENUE, &[100.0, 90.0, 95.0]).build();
    assert_points(&run(MarkerCode::M15, &growing), 0);
}

#[test]
fn short_term_investments_by_growth_or_share() {
    let builder = trailing(statements(), SHORT_TERM_INVESTMENTS, &[100.0, 160.0]);
    let growth = trailing(builder, TOTAL_ASSETS, &[10_000.0, 10_000.0]).build();
    assert_points(&run(MarkerCode::M16, &growth), 2);

    let builder = trailing(statements(), SHORT_TERM_INVESTMENTS, &[100.0, 140.0]);
    let share = trailing(builder, TOTAL_ASSETS, &[1_000.0, 500.0]).build();
    assert_points(&run(MarkerCode::M16, &share), 2);

    let builder = trailing(statements(), SHORT_TERM_INVESTMENTS, &[100.0, 110.0]);
    let steady = trailing(builder, TOTAL_ASSETS, &[1_000.0, 1_000.0]).build();
    assert_points(&run(MarkerCode::M16, &steady), 0);
}

#[test]
fn current_assets_flat_while_creditors_grow() {
    let builder = trailing(statements(), CURRENT_ASSETS, &[100.0, 100.0]);
    let set = trailing(builder, CREDITORS, &[100.0, 130.0]).build();
    assert_points(&run(MarkerCode::M17, &set), 2);

    let builder = trailing(statements(), CURRENT_ASSETS, &[100.0, 120.0]);
    let growing = trailing(builder, CREDITORS, &[100.0, 130.0]).build();
    assert_points(&run(MarkerCode::M17, &growing), 0);
}
