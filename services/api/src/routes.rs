use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use claim_triage::error::AppError;
use claim_triage::workflows::markers::{AggregateResult, MarkerEngine, RegistrySignals};
use claim_triage::workflows::stages::{
    LegalInput, LegalStage, StageOutcome, StructuralInput, StructuralStage,
};
use claim_triage::workflows::statements::{check_evaluation_year, StatementSet};
use claim_triage::workflows::status::{dates, normalize_status, CanonicalStatus};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct MarkersRequest {
    pub(crate) statements: StatementSet,
    #[serde(default)]
    pub(crate) year: Option<i32>,
    #[serde(default)]
    pub(crate) signals: Option<RegistrySignals>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    pub(crate) text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StructuralRequest {
    pub(crate) input: StructuralInput,
    #[serde(default, with = "dates::dotted")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) year: Option<i32>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/markers", post(markers_endpoint))
        .route("/api/v1/status/normalize", post(status_endpoint))
        .route("/api/v1/stages/structural", post(structural_endpoint))
        .route("/api/v1/stages/legal", post(legal_endpoint))
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn markers_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<MarkersRequest>,
) -> Result<Json<AggregateResult>, AppError> {
    let year = check_evaluation_year(payload.year.unwrap_or(state.evaluation_year))?;
    let engine = MarkerEngine::new(year);
    Ok(Json(engine.evaluate(&payload.statements, payload.signals.as_ref())))
}

pub(crate) async fn status_endpoint(Json(payload): Json<StatusRequest>) -> Json<CanonicalStatus> {
    Json(normalize_status(&payload.text))
}

pub(crate) async fn structural_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<StructuralRequest>,
) -> Result<Json<StageOutcome>, AppError> {
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    let year = check_evaluation_year(payload.year.unwrap_or(state.evaluation_year))?;
    Ok(Json(StructuralStage::new(today, year).evaluate(&payload.input)))
}

pub(crate) async fn legal_endpoint(
    Json(payload): Json<LegalInput>,
) -> Result<Json<StageOutcome>, AppError> {
    Ok(Json(LegalStage::new().evaluate(&payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use claim_triage::workflows::markers::MarkerCode;
    use claim_triage::workflows::stages::VerdictStatus;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router(test_state(2024))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn markers_route_scores_statement_payload() {
        let (status, body) = post_json(
            "/api/v1/markers",
            json!({
                "statements": {
                    "F1.1200": {"name": "Оборотные активы", "values": {"2024": "300"}},
                    "F1.1500": {"name": "Краткосрочные обязательства", "values": {"2024": 500}}
                }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_year_cap"], 2024);
        assert_eq!(body["markers"]["M2"]["points"], 2);
        assert_eq!(body["markers"]["M2"]["severity"], "critical");
        assert_eq!(body["markers"]["M9"]["not_applicable"], true);
    }

    #[tokio::test]
    async fn markers_route_rejects_unknown_line_keys() {
        let (status, _) = post_json(
            "/api/v1/markers",
            json!({ "statements": { "balance": {"values": {"2024": 1}} } }),
        )
        .await;

        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn markers_handler_honours_requested_year() {
        let request = MarkersRequest {
            statements: StatementSet::default(),
            year: Some(2021),
            signals: None,
        };
        let Json(result) = markers_endpoint(Extension(test_state(2024)), Json(request))
            .await
            .expect("year in range");

        assert_eq!(result.current_year_cap, 2021);
        assert_eq!(result.markers.len(), MarkerCode::ALL.len());
    }

    #[tokio::test]
    async fn out_of_range_years_are_unprocessable() {
        let (status, body) = post_json(
            "/api/v1/markers",
            json!({ "statements": {}, "year": i32::MIN }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains("1990..=2100")));

        let (status, body) = post_json(
            "/api/v1/stages/structural",
            json!({ "input": {}, "year": i32::MAX }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains("evaluation year")));
    }

    #[tokio::test]
    async fn status_route_normalizes_text() {
        let (status, body) = post_json(
            "/api/v1/status/normalize",
            json!({ "text": "Действующий, предстоящее исключение из ЕГРЮЛ. 05.06.2024" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["normalized"],
            "действующий, предстоящее исключение из ЕГРЮЛ 05.06.2024"
        );
        assert_eq!(body["date"], "05.06.2024");
    }

    #[tokio::test]
    async fn structural_route_uses_supplied_date() {
        let (status, body) = post_json(
            "/api/v1/stages/structural",
            json!({
                "today": "01.06.2025",
                "input": {
                    "company_status": "Действующая",
                    "registration_date": "10.03.2015",
                    "last_report_date": "28.03.2025"
                }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_points"], 13);
        assert_eq!(body["verdict"]["status"], "долг верифицирован с 80% уверенностью");
    }

    #[tokio::test]
    async fn legal_handler_reports_verdict() {
        let input = LegalInput {
            case_age_years: Some(1.0),
            case_sum: Some(120_000.0),
            case_status: "Судебное решение в силе".to_string(),
            ..LegalInput::default()
        };
        let Json(outcome) = legal_endpoint(Json(input)).await.expect("finite input");

        assert_eq!(outcome.total_points, 9);
        assert!(outcome.verdict.verified);
        assert_eq!(outcome.verdict.status, VerdictStatus::Verified80);
    }

    #[tokio::test]
    async fn legal_route_maps_stage_errors_to_unprocessable() {
        let err = legal_endpoint(Json(LegalInput {
            case_age_years: Some(2.0),
            time_to_claim_years: Some(1.0),
            sum_ratio: Some(f64::NAN),
            case_sum: Some(0.0),
            ..LegalInput::default()
        }))
        .await
        .expect_err("nan rejected");

        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn health_and_readiness() {
        let response = router(test_state(2024))
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }
}
