use serde::Serialize;
use std::io::Write;
use std::path::Path;

use super::aggregate::AggregateResult;
use super::domain::Severity;

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "failed to write marker report: {}", err),
            ExportError::Csv(err) => write!(f, "could not encode marker report as CSV: {}", err),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Serialize)]
struct MarkerRow<'a> {
    code: &'a str,
    name: &'a str,
    points: i32,
    triggered: bool,
    not_applicable: bool,
    severity: &'a str,
    why: &'a str,
}

/// Flat per-marker report for analysts, closed by a totals row.
pub struct MarkerReportExporter;

impl MarkerReportExporter {
    pub fn to_path<P: AsRef<Path>>(result: &AggregateResult, path: P) -> Result<(), ExportError> {
        let file = std::fs::File::create(path)?;
        Self::to_writer(result, file)
    }

    pub fn to_writer<W: Write>(result: &AggregateResult, writer: W) -> Result<(), ExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for marker in result.markers.values() {
            csv_writer.serialize(MarkerRow {
                code: marker.code.label(),
                name: &marker.name,
                points: marker.points,
                triggered: marker.triggered,
                not_applicable: marker.not_applicable,
                severity: marker.severity.map(severity_label).unwrap_or(""),
                why: &marker.why,
            })?;
        }

        let summary = match result.autopass_reason {
            Some(reason) => format!(
                "strong={} medium={} weak={} autopass={}",
                result.strong,
                result.medium,
                result.weak,
                reason.as_str()
            ),
            None => format!(
                "strong={} medium={} weak={} autopass=none",
                result.strong, result.medium, result.weak
            ),
        };
        csv_writer.serialize(MarkerRow {
            code: "TOTAL",
            name: "Итого",
            points: result.score_total,
            triggered: result.autopass,
            not_applicable: false,
            severity: "",
            why: &summary,
        })?;

        csv_writer.flush()?;
        Ok(())
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "critical",
        Severity::Elevated => "elevated",
        Severity::Normal => "normal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::markers::evaluate_all;
    use crate::workflows::statements::lines::{CURRENT_ASSETS, CURRENT_LIABILITIES};
    use crate::workflows::statements::StatementSet;

    #[test]
    fn writes_one_row_per_marker_plus_totals() {
        let set = StatementSet::builder()
            .value(CURRENT_ASSETS, 2024, 300.0)
            .value(CURRENT_LIABILITIES, 2024, 500.0)
            .build();
        let result = evaluate_all(&set, 2024, None);

        let mut buffer = Vec::new();
        MarkerReportExporter::to_writer(&result, &mut buffer).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf-8 output");
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows[0], "code,name,points,triggered,not_applicable,severity,why");
        assert_eq!(rows.len(), 1 + 19 + 1);
        assert!(rows[2].starts_with("M2,"));
        assert!(rows[2].contains(",2,true,false,critical,"));
        assert!(rows[20].starts_with("TOTAL,Итого,"));
    }
}
