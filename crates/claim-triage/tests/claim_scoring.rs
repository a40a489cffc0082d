//! End-to-end checks through the public API: statement JSON in, marker battery and stage
//! verdicts out.

use chrono::NaiveDate;
use claim_triage::workflows::markers::export::MarkerReportExporter;
use claim_triage::workflows::markers::{evaluate_all, AutopassReason, MarkerCode};
use claim_triage::workflows::stages::{
    check_presence, LegalInput, LegalStage, PresenceInput, StructuralInput, StructuralStage,
    VerdictStatus,
};
use claim_triage::workflows::statements::StatementSet;
use claim_triage::workflows::status::normalize_status;
use serde_json::Value;

const STATEMENTS: &str = r#"{
    "Ф1.1300": {"name": "Капитал и резервы", "values": {"2023": "−3", "2024": "-5"}},
    "F1.1200": {"name": "Оборотные активы", "values": {"2023": "410", "2024": "300"}},
    "F1.1500": {"name": "Краткосрочные обязательства", "values": {"2023": "450", "2024": "500,0"}},
    "F1.1600": {"name": "Баланс (актив)", "values": {"2024": "1 200"}},
    "F1.1700": {"name": "Баланс (пассив)", "values": {"2024": "1 200"}}
}"#;

#[test]
fn statement_json_flows_into_marker_battery() {
    let statements = StatementSet::from_json(STATEMENTS).expect("statements parse");
    let result = evaluate_all(&statements, 2024, None);

    assert_eq!(result.markers.len(), MarkerCode::ALL.len());
    assert_eq!(result.years_available, vec![2023, 2024]);

    let equity = result.marker(MarkerCode::M1).expect("M1 evaluated");
    assert!(equity.triggered);
    assert_eq!(equity.points, 3);

    let cash = result.marker(MarkerCode::M9).expect("M9 evaluated");
    assert!(cash.not_applicable);
    assert_eq!(cash.points, 0);

    let total: i32 = result.markers.values().map(|marker| marker.points).sum();
    assert_eq!(result.score_total, total);
}

#[test]
fn serialized_result_keys_audit_values_by_year() {
    let statements = StatementSet::from_json(STATEMENTS).expect("statements parse");
    let json = serde_json::to_value(evaluate_all(&statements, 2024, None)).expect("serializes");

    let liquidity = &json["markers"]["M2"];
    assert_eq!(liquidity["severity"], "critical");
    assert_eq!(liquidity["values"]["2024"]["F1.1200"], 300.0);
    assert_eq!(json["current_year_cap"], 2024);
    assert!(matches!(json["autopass"], Value::Bool(_)));
}

#[test]
fn distressed_company_autopasses_with_two_strong_markers() {
    let statements = StatementSet::from_json(STATEMENTS).expect("statements parse");
    let result = evaluate_all(&statements, 2024, None);

    assert!(result.strong >= 2);
    assert_eq!(result.autopass_reason, Some(AutopassReason::TwoStrongs));
}

#[test]
fn csv_report_lands_on_disk() {
    let statements = StatementSet::from_json(STATEMENTS).expect("statements parse");
    let result = evaluate_all(&statements, 2024, None);
    let path = std::env::temp_dir().join(format!("claim-triage-{}.csv", std::process::id()));

    MarkerReportExporter::to_path(&result, &path).expect("report written");
    let text = std::fs::read_to_string(&path).expect("report readable");
    std::fs::remove_file(&path).ok();

    assert_eq!(text.lines().count(), 1 + 19 + 1);
    assert!(text.contains("M1,"));
}

#[test]
fn registry_status_drives_both_stages() {
    let raw = "Юридическое лицо ликвидировано 19 ноября 2024 года";
    let status = normalize_status(raw);
    assert_eq!(status.normalized, "исключен из ЕГРЮЛ: иное 19.11.2024");

    let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
    let structural = StructuralStage::new(today, 2024).evaluate(&StructuralInput {
        company_status: raw.to_string(),
        ..StructuralInput::default()
    });
    assert_eq!(structural.total_points, 2);
    assert_eq!(structural.verdict.status, VerdictStatus::ConditionallyVerified);

    let legal = LegalStage::new()
        .evaluate(&LegalInput {
            case_age_years: Some(4.0),
            company_status: raw.to_string(),
            time_to_claim_years: Some(2.0),
            case_sum: None,
            sum_ratio: None,
            case_status: "Судебное решение в силе".to_string(),
        })
        .expect("finite input");
    assert_eq!(legal.total_points, 1 - 50 + 5);
    assert_eq!(legal.verdict.status, VerdictStatus::ConditionalSumUnconfirmed);
    assert!(legal.verdict.verified);
}

#[test]
fn intake_presence_is_reported_per_field() {
    let input: PresenceInput = serde_json::from_str(
        r#"{"contract_existence": true, "debt_sum": 50000, "debtor_inn": "7707083893"}"#,
    )
    .expect("presence input parses");
    let presence = check_presence(&input);

    assert!(presence.contract_existence);
    assert!(!presence.legality_debt_transfer);
    assert!(presence.debt_sum);
    assert!(presence.debtor_inn);
    assert!(!presence.debtor_name);
    assert!(!presence.is_complete());
}
