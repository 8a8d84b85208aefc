use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use credit_engine::decisioning::{decision_router, CreditDecisionService};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_decision_routes(service: Arc<CreditDecisionService>) -> axum::Router {
    decision_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        let payload = json!({
            "status": "ready",
            "artifactVersion": state.artifacts.version,
            "artifactsLoadedAt": state.artifacts.loaded_at.to_rfc3339(),
        });
        (StatusCode::OK, Json(payload))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ArtifactSummary;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use credit_engine::decisioning::{
        ArtifactStore, FixedProbabilityModel, RiskModelAdapter, Thresholds,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn service() -> Arc<CreditDecisionService> {
        let store = ArtifactStore::new(
            "routes-test",
            Thresholds {
                red_line_debt_ratio: 0.5,
                default_probability_cutoff: 0.6,
                overindebtedness_probability_cutoff: 0.55,
                median_income_imputation: 5400.0,
            },
        )
        .expect("valid thresholds");
        Arc::new(CreditDecisionService::new(
            Arc::new(store),
            RiskModelAdapter::new(
                Arc::new(FixedProbabilityModel(0.1)),
                Arc::new(FixedProbabilityModel(0.1)),
            ),
        ))
    }

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            artifacts: ArtifactSummary {
                version: "routes-test".to_string(),
                loaded_at: Utc::now(),
            },
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn readiness_reports_initializing_before_bind() {
        let app = with_decision_routes(service()).layer(Extension(state(false)));

        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "initializing");
    }

    #[tokio::test]
    async fn readiness_reports_artifact_version_when_ready() {
        let app = with_decision_routes(service()).layer(Extension(state(true)));

        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["artifactVersion"], "routes-test");
    }

    #[tokio::test]
    async fn decision_route_is_mounted() {
        let app = with_decision_routes(service()).layer(Extension(state(true)));
        let payload = json!({
            "revolvingUtilization": 0.2,
            "age": 50,
            "lateBand_30_59": 0,
            "openCreditLines": 4,
            "lateBand_90plus": 0,
            "realEstateLoans": 0,
            "lateBand_60_89": 0,
            "debtRatio": 0.1
        });

        let response = app
            .oneshot(
                Request::post("/api/v1/credit/decisions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["decision"], "APPROVED");
    }
}
