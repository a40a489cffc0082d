use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::{StageFactor, StageScore};
use crate::workflows::status::{CanonicalStatus, StatusCategory};

const SUBSIDIARY_LIABILITY: &str =
    "Взыскание возможно только при привлечении к субсидиарной ответственности при наличии активов у КДЛ.";
const FLY_BY_NIGHT: &str =
    "Компания зарегистрирована менее 1 года, что может быть риском компании-однодневки";
const EXCLUSION_LIMIT_YEARS: f64 = 3.0;
const DAYS_PER_YEAR: f64 = 365.25;

fn whole_years(from: NaiveDate, to: NaiveDate) -> i32 {
    let years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years - 1
    } else {
        years
    }
}

/// Points for the canonical company status. Dated categories without a date cannot be scored.
pub fn evaluate_company_status(status: &CanonicalStatus, today: NaiveDate) -> StageScore {
    let factor = StageFactor::CompanyStatus;
    let Some(category) = status.category else {
        return StageScore::not_applicable(factor, "статус компании не распознан");
    };
    let date = match (category.requires_date(), status.date) {
        (true, None) => {
            return StageScore::not_applicable(
                factor,
                format!("нет даты для статуса «{}»", category.label()),
            )
        }
        (_, date) => date,
    };

    let score = match category {
        StatusCategory::Active => StageScore::scored(factor, 6, ""),
        StatusCategory::UnreliableData => StageScore::scored(factor, 3, ""),
        StatusCategory::ActiveWithChanges { .. } => StageScore::scored(factor, 2, ""),
        StatusCategory::ExcludedReorganization
        | StatusCategory::ExcludedUnreliable
        | StatusCategory::ExcludedOther => {
            let elapsed = date
                .map(|date| (today - date).num_days() as f64 / DAYS_PER_YEAR)
                .unwrap_or_default();
            let points = if elapsed >= EXCLUSION_LIMIT_YEARS { -100 } else { 2 };
            StageScore::scored(factor, points, SUBSIDIARY_LIABILITY)
        }
        StatusCategory::ExcludedReceivership => StageScore::scored(factor, -100, ""),
        StatusCategory::BankruptReceivership => StageScore::scored(factor, -20, ""),
        StatusCategory::BankruptObservation => StageScore::scored(factor, -10, ""),
    };

    debug!(category = %category, points = score.points, "company status scored");
    score
}

pub fn evaluate_registration_age(registered: NaiveDate, today: NaiveDate) -> StageScore {
    let years = whole_years(registered, today);
    let score = match years {
        years if years < 1 => StageScore::scored(StageFactor::RegistrationAge, -4, FLY_BY_NIGHT),
        years if years < 3 => StageScore::scored(StageFactor::RegistrationAge, -2, ""),
        _ => StageScore::scored(StageFactor::RegistrationAge, 2, ""),
    };
    debug!(%registered, years, points = score.points, "registration age scored");
    score
}

/// Financial year whose statements should already be filed: reports are due by 1 April.
pub fn expected_report_year(today: NaiveDate) -> i32 {
    if (today.month(), today.day()) >= (4, 1) {
        today.year() - 1
    } else {
        today.year() - 2
    }
}

pub fn evaluate_reporting_freshness(last_report: NaiveDate, today: NaiveDate) -> StageScore {
    let lag = expected_report_year(today) - last_report.year();
    let points = match lag {
        lag if lag <= 0 => 5,
        1 => 2,
        _ => -3,
    };
    debug!(%last_report, lag, points, "reporting freshness scored");
    StageScore::scored(StageFactor::ReportingFreshness, points, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::status::normalize_status;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn active_and_transitional_statuses() {
        let today = date(2025, 6, 1);
        let points = |text: &str| evaluate_company_status(&normalize_status(text), today).points;

        assert_eq!(points("Действующая"), 6);
        assert_eq!(points("Сведения недостоверны 01.02.2024"), 3);
        assert_eq!(points("Действующий, предстоящее исключение из ЕГРЮЛ 05.06.2024"), 2);
        assert_eq!(points("Признан банкротом, конкурсное производство 01.01.2024"), -20);
        assert_eq!(points("Банкротство, наблюдение с 01.01.2024"), -10);
        assert_eq!(points("Исключен из ЕГРЮЛ, конкурсное производство 01.01.2024"), -100);
    }

    #[test]
    fn exclusion_age_decides_subsidiary_route() {
        let today = date(2025, 6, 1);
        let recent = normalize_status("Исключен из ЕГРЮЛ: реорганизация 12.03.2023");
        let old = normalize_status("Исключен из ЕГРЮЛ: реорганизация 12.03.2021");

        let recent = evaluate_company_status(&recent, today);
        assert_eq!(recent.points, 2);
        assert_eq!(recent.comment, SUBSIDIARY_LIABILITY);
        assert_eq!(evaluate_company_status(&old, today).points, -100);
    }

    #[test]
    fn undated_or_unknown_status_is_not_applicable() {
        let today = date(2025, 6, 1);
        let undated = evaluate_company_status(&normalize_status("Ликвидировано"), today);
        assert!(undated.not_applicable);
        assert_eq!(undated.points, 0);

        let unknown = evaluate_company_status(&normalize_status("???"), today);
        assert!(unknown.not_applicable);
    }

    #[test]
    fn registration_age_counts_full_years() {
        let today = date(2025, 6, 1);
        assert_eq!(evaluate_registration_age(date(2024, 6, 2), today).points, -4);
        assert_eq!(evaluate_registration_age(date(2024, 6, 1), today).points, -2);
        assert_eq!(evaluate_registration_age(date(2022, 6, 2), today).points, -2);
        assert_eq!(evaluate_registration_age(date(2022, 6, 1), today).points, 2);
        assert_eq!(
            evaluate_registration_age(date(2025, 1, 1), today).comment,
            FLY_BY_NIGHT
        );
    }

    #[test]
    fn freshness_moves_on_first_of_april() {
        assert_eq!(expected_report_year(date(2025, 3, 31)), 2023);
        assert_eq!(expected_report_year(date(2025, 4, 1)), 2024);

        let today = date(2025, 4, 1);
        assert_eq!(evaluate_reporting_freshness(date(2024, 12, 31), today).points, 5);
        assert_eq!(evaluate_reporting_freshness(date(2025, 3, 30), today).points, 5);
        assert_eq!(evaluate_reporting_freshness(date(2023, 12, 31), today).points, 2);
        assert_eq!(evaluate_reporting_freshness(date(2021, 12, 31), today).points, -3);
    }
}
