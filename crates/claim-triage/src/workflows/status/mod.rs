//! Registry status text normalization.
//!
//! Free-form EGRUL/court status strings are reduced to a closed set of canonical categories.
//! Categories describing a terminal or transitional state carry the date found in the text,
//! or an explicit "date not found" marker.

pub mod dates;
mod features;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use features::{collapse_whitespace, StatusFeatures};

pub const DATE_NOT_FOUND: &str = "дата не найдена";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reorganization {
    InProgress,
    Transformation,
}

/// Canonical company state recognised in registry text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    ExcludedReceivership,
    ExcludedUnreliable,
    ExcludedReorganization,
    ExcludedOther,
    BankruptReceivership,
    BankruptObservation,
    ActiveWithChanges {
        pending_exclusion: bool,
        reorganization: Option<Reorganization>,
    },
    UnreliableData,
    Active,
}

impl StatusCategory {
    pub fn label(&self) -> String {
        match self {
            StatusCategory::ExcludedReceivership => {
                "исключен из ЕГРЮЛ: конкурсное производство".to_string()
            }
            StatusCategory::ExcludedUnreliable => {
                "исключен из ЕГРЮЛ: недостоверность сведений".to_string()
            }
            StatusCategory::ExcludedReorganization => "исключен из ЕГРЮЛ: реорганизация".to_string(),
            StatusCategory::ExcludedOther => "исключен из ЕГРЮЛ: иное".to_string(),
            StatusCategory::BankruptReceivership => {
                "признан банкротом: конкурсное производство".to_string()
            }
            StatusCategory::BankruptObservation => "признан банкротом: наблюдение".to_string(),
            StatusCategory::ActiveWithChanges {
                pending_exclusion,
                reorganization,
            } => {
                let mut parts = Vec::new();
                if *pending_exclusion {
                    parts.push("предстоящее исключение из ЕГРЮЛ");
                }
                match reorganization {
                    Some(Reorganization::Transformation) => {
                        parts.push("в процессе реорганизации путем преобразования")
                    }
                    Some(Reorganization::InProgress) => parts.push("в процессе реорганизации"),
                    None => {}
                }
                format!("действующий, {}", parts.join(" / "))
            }
            StatusCategory::UnreliableData => "сведения недостоверны".to_string(),
            StatusCategory::Active => "действующий".to_string(),
        }
    }

    /// Every category except a plainly active company is expected to name a date.
    pub fn requires_date(&self) -> bool {
        !matches!(self, StatusCategory::Active)
    }

    pub fn is_excluded(&self) -> bool {
        matches!(
            self,
            StatusCategory::ExcludedReceivership
                | StatusCategory::ExcludedUnreliable
                | StatusCategory::ExcludedReorganization
                | StatusCategory::ExcludedOther
        )
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

type Rule = (
    fn(&StatusFeatures) -> bool,
    fn(&StatusFeatures) -> StatusCategory,
);

/// Ordered; the first matching predicate decides the category.
fn rules() -> [Rule; 9] {
    [
        (
            |f| f.excluded && f.receivership,
            |_| StatusCategory::ExcludedReceivership,
        ),
        (
            |f| f.excluded && f.unreliability,
            |_| StatusCategory::ExcludedUnreliable,
        ),
        (
            |f| f.excluded && f.reorganization,
            |_| StatusCategory::ExcludedReorganization,
        ),
        (|f| f.excluded, |_| StatusCategory::ExcludedOther),
        (
            |f| f.bankrupt && f.receivership,
            |_| StatusCategory::BankruptReceivership,
        ),
        (
            |f| f.bankrupt && f.observation,
            |_| StatusCategory::BankruptObservation,
        ),
        (
            |f| f.pending_exclusion || f.in_reorganization,
            |f| StatusCategory::ActiveWithChanges {
                pending_exclusion: f.pending_exclusion,
                reorganization: match (f.in_reorganization, f.transformation) {
                    (false, _) => None,
                    (true, true) => Some(Reorganization::Transformation),
                    (true, false) => Some(Reorganization::InProgress),
                },
            },
        ),
        (|f| f.unreliable_data, |_| StatusCategory::UnreliableData),
        (|f| f.active, |_| StatusCategory::Active),
    ]
}

pub fn classify(text: &str) -> Option<StatusCategory> {
    let features = StatusFeatures::detect(text);
    rules()
        .iter()
        .find(|(matches, _)| matches(&features))
        .map(|(_, category)| category(&features))
}

/// Normalized view of a registry status string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalStatus {
    pub raw: String,
    pub normalized: String,
    pub category: Option<StatusCategory>,
    #[serde(default, with = "dates::dotted")]
    pub date: Option<NaiveDate>,
    pub has_date: bool,
    /// `normalized` without the "date not found" suffix.
    pub normalized_for_eval: String,
}

impl CanonicalStatus {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
    }
}

pub fn normalize_status(raw: &str) -> CanonicalStatus {
    let collapsed = collapse_whitespace(raw);
    let category = classify(&collapsed);
    let date = category
        .filter(StatusCategory::requires_date)
        .and_then(|_| dates::extract_date(&collapsed));

    let normalized = match category {
        None => String::new(),
        Some(category) if !category.requires_date() => category.label(),
        Some(category) => match date {
            Some(date) => format!("{} {}", category.label(), dates::format_date(date)),
            None => format!("{} {DATE_NOT_FOUND}", category.label()),
        },
    };
    let normalized_for_eval = normalized
        .strip_suffix(DATE_NOT_FOUND)
        .map(str::trim_end)
        .unwrap_or(&normalized)
        .to_string();

    debug!(raw = %collapsed, normalized = %normalized, "status normalized");

    CanonicalStatus {
        raw: raw.to_string(),
        normalized,
        category,
        date,
        has_date: date.is_some(),
        normalized_for_eval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_exclusion_keeps_its_date() {
        let status = normalize_status("Действующий, предстоящее исключение из ЕГРЮЛ. 05.06.2024");

        assert_eq!(status.normalized, "действующий, предстоящее исключение из ЕГРЮЛ 05.06.2024");
        assert!(status.has_date);
        assert_eq!(
            status.category,
            Some(StatusCategory::ActiveWithChanges {
                pending_exclusion: true,
                reorganization: None
            })
        );
    }

    #[test]
    fn excluded_by_reorganization_round_trip() {
        let status = normalize_status("Исключен из ЕГРЮЛ: реорганизация с 12.03.2023");

        assert_eq!(status.normalized, "исключен из ЕГРЮЛ: реорганизация 12.03.2023");
        assert!(status.has_date);
        assert_eq!(status.normalized_for_eval, status.normalized);

        let again = normalize_status(&status.normalized);
        assert_eq!(again.normalized, status.normalized);
    }

    #[test]
    fn missing_date_is_marked_and_stripped_for_evaluation() {
        let status = normalize_status("Юридическое лицо ликвидировано");

        assert_eq!(status.normalized, "исключен из ЕГРЮЛ: иное дата не найдена");
        assert_eq!(status.normalized_for_eval, "исключен из ЕГРЮЛ: иное");
        assert!(!status.has_date);
        assert_eq!(status.date, None);
    }

    #[test]
    fn rule_order_follows_keyword_priority() {
        let status = normalize_status(
            "Исключен из ЕГРЮЛ в связи с завершением конкурсного производства; недостоверность",
        );
        assert_eq!(status.category, Some(StatusCategory::ExcludedUnreliable));

        let status = normalize_status("Ликвидировано, конкурсное производство завершено 19 ноября 2024 года");
        assert_eq!(
            status.normalized,
            "исключен из ЕГРЮЛ: конкурсное производство 19.11.2024"
        );
    }

    #[test]
    fn bankruptcy_stages_are_distinguished() {
        assert_eq!(
            classify("Признан банкротом, открыто конкурсное производство"),
            Some(StatusCategory::BankruptReceivership)
        );
        assert_eq!(
            classify("Заявление о признании несостоятельным (банкротом), введено наблюдение"),
            Some(StatusCategory::BankruptObservation)
        );
    }

    #[test]
    fn reorganization_by_transformation_label() {
        let status = normalize_status(
            "Действующая организация, предстоящее исключение из ЕГРЮЛ, в процессе реорганизации путем преобразования",
        );
        assert_eq!(
            status.normalized_for_eval,
            "действующий, предстоящее исключение из ЕГРЮЛ / в процессе реорганизации путем преобразования"
        );
    }

    #[test]
    fn active_and_unknown_statuses() {
        let active = normalize_status("Действующая компания");
        assert_eq!(active.normalized, "действующий");
        assert!(!active.has_date);

        let unreliable = normalize_status("Сведения недостоверны (решение от 01.02.2024)");
        assert_eq!(unreliable.normalized, "сведения недостоверны 01.02.2024");

        let inactive = normalize_status("Недействующая организация");
        assert!(inactive.is_empty());
        assert_eq!(inactive.category, None);

        let unknown = normalize_status("нет данных");
        assert!(unknown.is_empty());
        assert_eq!(unknown.normalized, "");
        assert_eq!(unknown.normalized_for_eval, "");
    }
}
