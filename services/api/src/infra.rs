use chrono::NaiveDate;
use claim_triage::error::AppError;
use claim_triage::workflows::status::dates;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    /// Statement year used when a request does not name one.
    pub(crate) evaluation_year: i32,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    dates::parse_date(raw.trim())
        .ok_or_else(|| format!("failed to parse '{raw}' as dd.mm.yyyy"))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
pub(crate) fn test_state(evaluation_year: i32) -> AppState {
    use metrics_exporter_prometheus::PrometheusBuilder;

    AppState {
        readiness: Arc::new(AtomicBool::new(true)),
        metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        evaluation_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_dates_use_dotted_format() {
        assert_eq!(
            parse_date(" 01.06.2025 "),
            Ok(NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"))
        );
        assert!(parse_date("2025-06-01").is_err());
    }
}
