use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{ApplicantRecord, DecisionOutcome};
use super::service::{CreditDecisionService, DecisionServiceError};
use crate::error::AppError;

pub const DECISIONS_PATH: &str = "/api/v1/credit/decisions";
pub const THRESHOLDS_PATH: &str = "/api/v1/credit/thresholds";

/// Router builder exposing the decision endpoint.
pub fn decision_router(service: Arc<CreditDecisionService>) -> Router {
    Router::new()
        .route(DECISIONS_PATH, post(decide_handler))
        .route(THRESHOLDS_PATH, get(thresholds_handler))
        .with_state(service)
}

pub(crate) async fn decide_handler(
    State(service): State<Arc<CreditDecisionService>>,
    axum::Json(record): axum::Json<ApplicantRecord>,
) -> Result<axum::Json<DecisionOutcome>, AppError> {
    let outcome = service.evaluate(&record).await?;
    Ok(axum::Json(outcome))
}

/// `model` names the first failing estimator; `models` lists all of them.
impl IntoResponse for DecisionServiceError {
    fn into_response(self) -> Response {
        let models = self
            .failed_models()
            .into_iter()
            .map(|kind| kind.key())
            .collect::<Vec<_>>();
        let payload = json!({
            "error": "model_unavailable",
            "model": models.first(),
            "models": models,
            "detail": self.to_string(),
        });
        (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
    }
}

pub(crate) async fn thresholds_handler(
    State(service): State<Arc<CreditDecisionService>>,
) -> Response {
    let artifacts = service.artifacts();
    let payload = json!({
        "version": artifacts.version(),
        "loadedAt": artifacts.loaded_at().to_rfc3339(),
        "thresholds": artifacts.thresholds(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
