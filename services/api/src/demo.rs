use crate::infra::{parse_date, read_json};
use chrono::{Local, NaiveDate};
use clap::Args;
use claim_triage::config::AppConfig;
use claim_triage::error::AppError;
use claim_triage::workflows::markers::export::MarkerReportExporter;
use claim_triage::workflows::markers::{AggregateResult, MarkerEngine, RegistrySignals};
use claim_triage::workflows::stages::{
    LegalInput, LegalStage, RedFlags, StageOutcome, StructuralInput, StructuralStage,
};
use claim_triage::workflows::statements::lines::{
    CASH, CREDITORS, CURRENT_ASSETS, CURRENT_LIABILITIES, EQUITY, FIXED_ASSETS, INVENTORY,
    LONG_TERM_DEBT, RECEIVABLES, REVENUE, SHORT_TERM_DEBT, TOTAL_ASSETS, TOTAL_LIABILITIES,
};
use claim_triage::workflows::statements::{check_evaluation_year, StatementSet};
use claim_triage::workflows::status::normalize_status;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct MarkersArgs {
    /// Statement set JSON keyed by line (e.g. "F1.1200")
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Latest statement year to evaluate (defaults to TRIAGE_EVALUATION_YEAR)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Optional registry signals JSON (tax payments, activity flags)
    #[arg(long)]
    pub(crate) signals: Option<PathBuf>,
    /// Also write the per-marker CSV report to this path
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for age and freshness checks (dd.mm.yyyy). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Latest statement year for the sample company
    #[arg(long)]
    pub(crate) year: Option<i32>,
}

pub(crate) fn run_markers(args: MarkersArgs, config: &AppConfig) -> Result<(), AppError> {
    let MarkersArgs {
        input,
        year,
        signals,
        csv,
    } = args;

    let statements: StatementSet = read_json(&input)?;
    let signals: Option<RegistrySignals> = signals.map(|path| read_json(&path)).transpose()?;
    let year = check_evaluation_year(year.unwrap_or(config.engine.evaluation_year))?;

    let result = MarkerEngine::new(year).evaluate(&statements, signals.as_ref());
    if let Some(path) = csv {
        MarkerReportExporter::to_path(&result, &path)?;
        info!(path = %path.display(), "marker report written");
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub(crate) fn run_status(text: &str) -> Result<(), AppError> {
    let status = normalize_status(text);
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let year = check_evaluation_year(args.year.unwrap_or(config.engine.evaluation_year))?;

    println!("Claim triage demo");
    println!("Evaluation year {year}, reference date {}", today.format("%d.%m.%Y"));

    let statements = sample_statements(year);
    let signals = sample_signals(year);
    let markers = MarkerEngine::new(year).evaluate(&statements, Some(&signals));
    render_markers(&markers);

    println!("\nStatus normalization");
    for raw in SAMPLE_STATUSES {
        let status = normalize_status(raw);
        println!("- {raw:?} -> {:?}", status.normalized);
    }

    let structural = StructuralStage::new(today, year).evaluate(&sample_structural_input(&statements));
    render_stage("Structural stage", &structural);

    let legal = LegalStage::new().evaluate(&sample_legal_input())?;
    render_stage("Legal stage", &legal);

    Ok(())
}

const SAMPLE_STATUSES: [&str; 4] = [
    "Действующая организация",
    "Действующий, предстоящее исключение из ЕГРЮЛ. 05.06.2024",
    "Юридическое лицо ликвидировано 19 ноября 2024 года",
    "Признан банкротом, открыто конкурсное производство 01.02.2024",
];

/// A company sliding into insolvency over the three years ending at `year`.
pub(crate) fn sample_statements(year: i32) -> StatementSet {
    let span = |values: [f64; 3]| [(year - 2, values[0]), (year - 1, values[1]), (year, values[2])];

    StatementSet::builder()
        .name(FIXED_ASSETS, "Основные средства")
        .series(FIXED_ASSETS, &span([4_800.0, 3_900.0, 2_600.0]))
        .series(CURRENT_ASSETS, &span([6_200.0, 5_900.0, 5_700.0]))
        .series(INVENTORY, &span([1_100.0, 1_500.0, 2_100.0]))
        .series(RECEIVABLES, &span([3_900.0, 3_700.0, 3_300.0]))
        .series(CASH, &span([420.0, 180.0, 60.0]))
        .series(EQUITY, &span([1_300.0, -250.0, -900.0]))
        .series(LONG_TERM_DEBT, &span([1_000.0, 1_200.0, 1_400.0]))
        .series(SHORT_TERM_DEBT, &span([2_000.0, 2_600.0, 3_100.0]))
        .series(CURRENT_LIABILITIES, &span([6_100.0, 7_600.0, 9_000.0]))
        .series(CREDITORS, &span([3_100.0, 4_400.0, 5_900.0]))
        .series(TOTAL_ASSETS, &span([11_000.0, 9_800.0, 8_300.0]))
        .series(TOTAL_LIABILITIES, &span([11_000.0, 9_800.0, 8_300.0]))
        .name(REVENUE, "Выручка")
        .series(REVENUE, &span([5_200.0, 3_900.0, 2_500.0]))
        .build()
}

fn sample_signals(year: i32) -> RegistrySignals {
    let mut signals = RegistrySignals::default();
    signals.property_tax.insert(year - 1, 120.0);
    signals.property_tax.insert(year, 4.0);
    signals.transport_tax.insert(year - 1, 35.0);
    signals.rosstat_active.insert(year, false);
    signals
}

fn sample_structural_input(statements: &StatementSet) -> StructuralInput {
    StructuralInput {
        company_status: SAMPLE_STATUSES[0].to_string(),
        registration_date: NaiveDate::from_ymd_opt(2016, 2, 11),
        last_report_date: NaiveDate::from_ymd_opt(2025, 3, 27),
        red_flags: RedFlags {
            staff_reduction: Some(true),
            bankruptcy_intent: Some(false),
            ..RedFlags::default()
        },
        statements: Some(statements.clone()),
    }
}

fn sample_legal_input() -> LegalInput {
    LegalInput {
        case_age_years: Some(1.5),
        company_status: SAMPLE_STATUSES[0].to_string(),
        time_to_claim_years: Some(0.8),
        case_sum: Some(1_250_000.0),
        sum_ratio: Some(1.05),
        case_status: "Судебное решение в силе".to_string(),
    }
}

fn render_markers(result: &AggregateResult) {
    println!("\nFinancial markers");
    for marker in result.markers.values() {
        let state = if marker.not_applicable {
            "n/a".to_string()
        } else if marker.triggered {
            format!("+{}", marker.points)
        } else {
            "ok".to_string()
        };
        println!("- {} {:<4} {}", marker.code.label(), state, marker.name);
    }

    let reason = result
        .autopass_reason
        .map(|reason| reason.as_str())
        .unwrap_or("none");
    println!(
        "Total {} (strong {}, medium {}, weak {}), autopass: {}",
        result.score_total, result.strong, result.medium, result.weak, reason
    );
}

fn render_stage(title: &str, outcome: &StageOutcome) {
    println!("\n{title}");
    for component in &outcome.components {
        let points = if component.not_applicable {
            "n/a".to_string()
        } else {
            format!("{:+}", component.points)
        };
        println!("- {:?}: {points} {}", component.factor, component.comment);
    }
    println!(
        "Total {} -> {} (verified: {})",
        outcome.total_points, outcome.verdict.status, outcome.verdict.verified
    );
}
