/// Parse a locale-formatted amount such as `"35 545,7"`, `"1\u{a0}200.5"` or `"−12"`.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '\u{a0}' | '\u{202f}' | '\u{2009}' | '\t'))
        .map(|ch| match ch {
            ',' => '.',
            '\u{2212}' | '\u{2013}' => '-',
            other => other,
        })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}
