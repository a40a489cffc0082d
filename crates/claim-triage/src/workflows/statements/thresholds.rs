//! Shared float comparisons so every marker treats boundaries the same way.

pub const EPSILON: f64 = 1e-9;

/// `value < limit`, with values within epsilon below the limit treated as equal.
pub fn less_than(value: f64, limit: f64) -> bool {
    value < limit - EPSILON
}

pub fn less_or_equal(value: f64, limit: f64) -> bool {
    value <= limit + EPSILON
}

pub fn greater_than(value: f64, limit: f64) -> bool {
    value > limit + EPSILON
}

pub fn greater_or_equal(value: f64, limit: f64) -> bool {
    value >= limit - EPSILON
}

pub fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() <= EPSILON
}

/// Division that yields `None` for a missing operand or a zero denominator.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (numerator, denominator) = (numerator?, denominator?);
    if approx_eq(denominator, 0.0) {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

/// Relative change `(curr - prev) / |prev|`; `None` when the base is zero.
pub fn pct_change(prev: f64, curr: f64) -> Option<f64> {
    if approx_eq(prev, 0.0) {
        return None;
    }
    let value = (curr - prev) / prev.abs();
    value.is_finite().then_some(value)
}
