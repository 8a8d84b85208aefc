use chrono::{DateTime, Utc};
use credit_engine::config::ArtifactConfig;
use credit_engine::decisioning::{ArtifactStore, CreditDecisionService, RiskModelAdapter};
use credit_engine::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) artifacts: ArtifactSummary,
}

/// Identity of the artifact bundle the running service decides with.
#[derive(Debug, Clone)]
pub(crate) struct ArtifactSummary {
    pub(crate) version: String,
    pub(crate) loaded_at: DateTime<Utc>,
}

impl ArtifactSummary {
    pub(crate) fn of(store: &ArtifactStore) -> Self {
        Self {
            version: store.version().to_string(),
            loaded_at: store.loaded_at(),
        }
    }
}

/// Loads thresholds (fatal on failure) and both estimators (degraded on failure).
pub(crate) fn build_decision_service(
    config: &ArtifactConfig,
) -> Result<CreditDecisionService, AppError> {
    let store = ArtifactStore::from_path(&config.bundle_path)?;
    info!(
        version = store.version(),
        path = %config.bundle_path.display(),
        "decision artifacts loaded"
    );

    let models = RiskModelAdapter::load(
        &config.default_model_path,
        &config.overindebtedness_model_path,
    );

    Ok(CreditDecisionService::with_timeout(
        Arc::new(store),
        models,
        config.model_timeout,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn bundled(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../artifacts")
            .join(name)
    }

    #[test]
    fn missing_bundle_prevents_service_construction() {
        let config = ArtifactConfig {
            bundle_path: bundled("absent.json"),
            default_model_path: bundled("default_risk_model.json"),
            overindebtedness_model_path: bundled("overindebtedness_model.json"),
            model_timeout: Duration::from_millis(500),
        };

        let err = build_decision_service(&config)
            .err()
            .expect("missing bundle is fatal");
        assert!(matches!(err, AppError::Artifacts(_)));
    }

    #[test]
    fn bundled_artifacts_build_a_service() {
        let config = ArtifactConfig {
            bundle_path: bundled("decision_artifacts.json"),
            default_model_path: bundled("default_risk_model.json"),
            overindebtedness_model_path: bundled("overindebtedness_model.json"),
            model_timeout: Duration::from_millis(500),
        };

        let service = build_decision_service(&config).expect("service builds");
        assert_eq!(service.thresholds().red_line_debt_ratio, 0.5);
        assert_eq!(ArtifactSummary::of(service.artifacts()).version, "2024.06-lei14181");
    }
}
