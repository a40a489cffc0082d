use chrono::NaiveDate;

use super::*;
use crate::workflows::statements::lines::{FIXED_ASSETS, REVENUE};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn stage() -> StructuralStage {
    StructuralStage::new(date(2025, 6, 1), 2024)
}

#[test]
fn healthy_company_passes_structural_stage() {
    let input = StructuralInput {
        company_status: "Действующая компания".to_string(),
        registration_date: Some(date(2015, 3, 10)),
        last_report_date: Some(date(2025, 3, 28)),
        red_flags: RedFlags {
            no_finance_3y: Some(false),
            no_data_3y: Some(false),
            staff_reduction: Some(false),
            fixed_assets_reduction: Some(false),
            bankruptcy_intent: Some(false),
        },
        statements: None,
    };
    let outcome = stage().evaluate(&input);

    assert_eq!(outcome.total_points, 6 + 2 + 5);
    assert!(outcome.verdict.verified);
    assert_eq!(outcome.verdict.status, VerdictStatus::Verified80);
    assert_eq!(outcome.components.len(), 4);
}

#[test]
fn liquidated_company_is_written_off() {
    let input = StructuralInput {
        company_status: "Исключен из ЕГРЮЛ (конкурсное производство завершено) 01.02.2020"
            .to_string(),
        registration_date: Some(date(2010, 1, 1)),
        last_report_date: Some(date(2019, 3, 1)),
        red_flags: RedFlags {
            no_finance_3y: Some(true),
            no_data_3y: Some(true),
            ..RedFlags::default()
        },
        statements: None,
    };
    let outcome = stage().evaluate(&input);

    assert_eq!(outcome.total_points, -100 + 2 - 3 - 15);
    assert_eq!(outcome.verdict.status, VerdictStatus::NotVerifiedWriteOff);
    assert!(outcome.verdict.reason.contains("Красные флаги"));
}

#[test]
fn missing_inputs_contribute_nothing_but_say_so() {
    let outcome = stage().evaluate(&StructuralInput::default());

    assert_eq!(outcome.total_points, 0);
    assert!(outcome.components.iter().all(|component| component.not_applicable));
    assert_eq!(outcome.verdict.status, VerdictStatus::ConditionallyVerified);
}

#[test]
fn statements_fill_unanswered_flags() {
    let statements = StatementSet::builder()
        .series(FIXED_ASSETS, &[(2022, 500.0), (2023, 400.0), (2024, 300.0)])
        .series(REVENUE, &[(2022, 90.0), (2023, 80.0), (2024, 70.0)])
        .build();
    let input = StructuralInput {
        company_status: "Действующая".to_string(),
        red_flags: RedFlags {
            staff_reduction: Some(true),
            ..RedFlags::default()
        },
        statements: Some(statements),
        ..StructuralInput::default()
    };
    let outcome = stage().evaluate(&input);
    let flags = outcome
        .components
        .iter()
        .find(|component| component.factor == StageFactor::RedFlags)
        .expect("red flag component");

    assert_eq!(flags.points, -4 - 7);
    assert_eq!(outcome.total_points, 6 - 11);
}

#[test]
fn structural_input_reads_dotted_dates() {
    let input: StructuralInput = serde_json::from_str(
        r#"{"company_status": "Действующая", "registration_date": "10.03.2015", "last_report_date": null}"#,
    )
    .expect("valid input");

    assert_eq!(input.registration_date, Some(date(2015, 3, 10)));
    assert_eq!(input.last_report_date, None);
}

#[test]
fn court_confirmed_claim_is_verified_legally() {
    let input = LegalInput {
        case_age_years: Some(1.0),
        company_status: "Действующая".to_string(),
        time_to_claim_years: Some(0.5),
        case_sum: Some(250_000.0),
        sum_ratio: Some(1.0),
        case_status: "Судебное решение в силе".to_string(),
    };
    let outcome = LegalStage::new().evaluate(&input).expect("finite inputs");

    assert_eq!(outcome.total_points, 2 + 2 + 5);
    assert!(outcome.verdict.verified);
    assert_eq!(
        outcome.verdict.status.as_str(),
        "долг верифицирован с 80% уверенностью"
    );
}

#[test]
fn young_case_scores_terms_without_claim_time() {
    let input = LegalInput {
        case_age_years: Some(1.0),
        case_sum: Some(120_000.0),
        case_status: "Судебное решение в силе".to_string(),
        ..LegalInput::default()
    };
    let outcome = LegalStage::new().evaluate(&input).expect("finite inputs");
    let terms = &outcome.components[0];

    assert_eq!(terms.factor, StageFactor::ClaimTerms);
    assert_eq!((terms.points, terms.not_applicable), (2, false));
    assert_eq!(outcome.total_points, 2 + 2 + 5);
}

#[test]
fn missing_case_age_leaves_terms_unscored() {
    let input = LegalInput {
        time_to_claim_years: Some(1.0),
        case_sum: Some(120_000.0),
        ..LegalInput::default()
    };
    let outcome = LegalStage::new().evaluate(&input).expect("finite inputs");

    assert!(outcome.components[0].not_applicable);
    assert_eq!(outcome.components[0].comment, "нет данных о возрасте дела");
}

#[test]
fn inactive_company_gets_no_active_bonus() {
    let input = StructuralInput {
        company_status: "Недействующая организация".to_string(),
        ..StructuralInput::default()
    };
    let outcome = stage().evaluate(&input);
    let status = outcome
        .components
        .iter()
        .find(|component| component.factor == StageFactor::CompanyStatus)
        .expect("company status component");

    assert!(status.not_applicable);
    assert_eq!(outcome.total_points, 0);
}

#[test]
fn withdrawn_claim_is_rejected_with_reasons() {
    let input = LegalInput {
        case_age_years: Some(5.0),
        company_status: "Действующая".to_string(),
        time_to_claim_years: Some(4.0),
        case_sum: None,
        sum_ratio: None,
        case_status: "Отказ от иска со стороны кредитора".to_string(),
    };
    let outcome = LegalStage::new().evaluate(&input).expect("finite inputs");

    assert_eq!(outcome.total_points, -250);
    assert_eq!(outcome.verdict.status, VerdictStatus::LegallyNotVerified);
    assert!(outcome
        .verdict
        .reason
        .contains("сроки подачи иска пропущены"));
}

#[test]
fn excluded_company_uses_normalized_status_for_terms() {
    let input = LegalInput {
        case_age_years: Some(4.0),
        company_status: "Юридическое лицо ликвидировано 01.02.2024".to_string(),
        time_to_claim_years: Some(1.0),
        case_sum: Some(10.0),
        case_status: "Дело оставлено без рассмотрения".to_string(),
        ..LegalInput::default()
    };
    let outcome = LegalStage::new().evaluate(&input).expect("finite inputs");

    assert_eq!(outcome.components[0].points, 1);
    assert_eq!(outcome.total_points, 1 + 2 + 2);
    assert_eq!(outcome.verdict.status, VerdictStatus::Verified80);
}

#[test]
fn non_finite_legal_input_is_an_error() {
    let input = LegalInput {
        case_age_years: Some(f64::INFINITY),
        time_to_claim_years: Some(1.0),
        ..LegalInput::default()
    };

    assert!(LegalStage::new().evaluate(&input).is_err());
}
