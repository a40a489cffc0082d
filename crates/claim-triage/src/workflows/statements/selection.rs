use super::{LineKey, StatementSet};

/// How many years before the evaluation year a marker may reach back.
pub const LOOKBACK_YEARS: i32 = 3;

/// Years present in the set inside `[cap - LOOKBACK_YEARS, cap]`, newest first.
pub fn lookback_years(set: &StatementSet, cap: i32) -> Vec<i32> {
    set.available_years()
        .range(cap - LOOKBACK_YEARS..=cap)
        .rev()
        .copied()
        .collect()
}

/// Values of every `keys` line for one year, if all of them parse.
pub(crate) fn values_for<const N: usize>(
    set: &StatementSet,
    keys: [LineKey; N],
    year: i32,
) -> Option<[f64; N]> {
    let mut values = [0.0; N];
    for (slot, key) in values.iter_mut().zip(keys) {
        *slot = set.value(key, year)?;
    }
    Some(values)
}

/// Most recent year in the lookback window where every line in `keys` is present.
pub fn latest_year_with<const N: usize>(
    set: &StatementSet,
    keys: [LineKey; N],
    cap: i32,
) -> Option<(i32, [f64; N])> {
    lookback_years(set, cap)
        .into_iter()
        .find_map(|year| values_for(set, keys, year).map(|values| (year, values)))
}

/// Two adjacent available years compared by the dynamic markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearPair<const N: usize> {
    pub prev: i32,
    pub curr: i32,
    pub prev_values: [f64; N],
    pub curr_values: [f64; N],
}

/// Newest adjacent pair of available years where every line in `keys` is present in both.
pub fn latest_pair_with<const N: usize>(
    set: &StatementSet,
    keys: [LineKey; N],
    cap: i32,
) -> Option<YearPair<N>> {
    let years = lookback_years(set, cap);
    years.windows(2).find_map(|window| {
        let (curr, prev) = (window[0], window[1]);
        let curr_values = values_for(set, keys, curr)?;
        let prev_values = values_for(set, keys, prev)?;
        Some(YearPair {
            prev,
            curr,
            prev_values,
            curr_values,
        })
    })
}
