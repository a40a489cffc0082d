use crate::workflows::markers::{MarkerCode, MarkerInput, MarkerResult, RegistrySignals};
use crate::workflows::statements::{LineKey, StatementSet, StatementSetBuilder};

pub(super) const YEAR: i32 = 2024;

pub(super) fn statements() -> StatementSetBuilder {
    StatementSet::builder()
}

/// Same line filled for consecutive years ending at `YEAR`, oldest value first.
pub(super) fn trailing(builder: StatementSetBuilder, key: LineKey, values: &[f64]) -> StatementSetBuilder {
    let first = YEAR - values.len() as i32 + 1;
    let series: Vec<(i32, f64)> = values
        .iter()
        .enumerate()
        .map(|(offset, value)| (first + offset as i32, *value))
        .collect();
    builder.series(key, &series)
}

pub(super) fn run(code: MarkerCode, set: &StatementSet) -> MarkerResult {
    code.evaluate(&MarkerInput::new(set, YEAR))
}

pub(super) fn run_with_signals(
    code: MarkerCode,
    set: &StatementSet,
    signals: &RegistrySignals,
) -> MarkerResult {
    code.evaluate(&MarkerInput::new(set, YEAR).with_signals(signals))
}

pub(super) fn assert_not_applicable(result: &MarkerResult) {
    assert!(result.not_applicable, "{} should be not applicable: {}", result.code.label(), result.why);
    assert!(!result.triggered);
    assert_eq!(result.points, 0);
}

pub(super) fn assert_points(result: &MarkerResult, points: i32) {
    assert!(!result.not_applicable, "{} unexpectedly not applicable: {}", result.code.label(), result.why);
    assert_eq!(result.triggered, points > 0, "{}: {}", result.code.label(), result.why);
    assert_eq!(result.points, points, "{}: {}", result.code.label(), result.why);
}
