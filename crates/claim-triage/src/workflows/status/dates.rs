use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

pub(crate) const DATE_FORMAT: &str = "%d.%m.%Y";

static NUMERIC_DATE: OnceLock<Option<Regex>> = OnceLock::new();
static TEXTUAL_DATE: OnceLock<Option<Regex>> = OnceLock::new();

fn numeric_date() -> Option<&'static Regex> {
    NUMERIC_DATE
        .get_or_init(|| Regex::new(r"\b(\d{1,2})[.\-/](\d{1,2})[.\-/](\d{4})\b").ok())
        .as_ref()
}

fn textual_date() -> Option<&'static Regex> {
    TEXTUAL_DATE
        .get_or_init(|| Regex::new(r"(\d{1,2})\s+([а-яё]+)\s+(\d{4})").ok())
        .as_ref()
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
        "октября", "ноября", "декабря",
    ];
    MONTHS
        .iter()
        .position(|month| *month == name)
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

/// First `d.m.yyyy` style date (also `-` or `/` separated); an impossible date yields `None`.
pub(crate) fn extract_numeric_date(text: &str) -> Option<NaiveDate> {
    let captures = numeric_date()?.captures(text)?;
    let day = captures.get(1)?.as_str().parse().ok()?;
    let month = captures.get(2)?.as_str().parse().ok()?;
    let year = captures.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// First Russian textual date such as `19 ноября 2024 года`.
pub(crate) fn extract_textual_date(text: &str) -> Option<NaiveDate> {
    let lowered = text.to_lowercase();
    let captures = textual_date()?.captures(&lowered)?;
    let day = captures.get(1)?.as_str().parse().ok()?;
    let month = month_number(captures.get(2)?.as_str())?;
    let year = captures.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub(crate) fn extract_date(text: &str) -> Option<NaiveDate> {
    extract_numeric_date(text).or_else(|| extract_textual_date(text))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Serde adapter keeping engine dates in `dd.mm.yyyy`.
pub mod dotted {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&super::format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse_date(value)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("expected dd.mm.yyyy date, got '{value}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn numeric_dates_accept_mixed_separators() {
        assert_eq!(extract_numeric_date("ликвидировано 5.6.2024"), Some(date(2024, 6, 5)));
        assert_eq!(extract_numeric_date("с 01-02-2023"), Some(date(2023, 2, 1)));
        assert_eq!(extract_numeric_date("от 31/12/2021 г."), Some(date(2021, 12, 31)));
    }

    #[test]
    fn impossible_numeric_dates_are_rejected() {
        assert_eq!(extract_numeric_date("31.02.2024"), None);
        assert_eq!(extract_numeric_date("без даты"), None);
    }

    #[test]
    fn russian_month_names_are_understood() {
        assert_eq!(extract_textual_date("с 19 ноября 2024 года"), Some(date(2024, 11, 19)));
        assert_eq!(extract_textual_date("8 Сентября 2022 г."), Some(date(2022, 9, 8)));
        assert_eq!(extract_textual_date("8 смарта 2022"), None);
    }

    #[test]
    fn numeric_form_wins_over_textual() {
        assert_eq!(
            extract_date("19 ноября 2024 года, запись от 01.12.2024"),
            Some(date(2024, 12, 1))
        );
    }

    #[test]
    fn dotted_format_round_trips() {
        assert_eq!(format_date(date(2024, 6, 5)), "05.06.2024");
        assert_eq!(parse_date(" 05.06.2024 "), Some(date(2024, 6, 5)));
        assert_eq!(parse_date("2024-06-05"), None);
    }
}
