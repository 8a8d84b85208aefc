use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::timeout;

use super::artifacts::{ArtifactStore, Thresholds};
use super::domain::{ApplicantRecord, DecisionOutcome, RiskScores};
use super::evaluation::DecisionEngine;
use super::features::FeatureDeriver;
use super::models::{ModelKind, ModelUnavailable, RiskModelAdapter};

pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_MODEL_CONCURRENCY: usize = 64;

/// Service composing the artifact snapshot, both estimators, and the decision engine.
///
/// Everything it holds is read-only after construction, so one instance is
/// shared across all concurrent requests.
///
/// A model call that exceeds the timeout is abandoned but its blocking thread
/// keeps running until the estimator returns. Each call holds a permit from
/// `model_permits` for as long as that thread runs, so a hung estimator can
/// occupy at most the permit count (`DEFAULT_MODEL_CONCURRENCY` unless set with
/// [`Self::with_model_concurrency`]); later calls wait for a permit within their
/// own timeout.
pub struct CreditDecisionService {
    artifacts: Arc<ArtifactStore>,
    models: RiskModelAdapter,
    engine: DecisionEngine,
    model_timeout: Duration,
    model_permits: Arc<Semaphore>,
}

impl CreditDecisionService {
    pub fn new(artifacts: Arc<ArtifactStore>, models: RiskModelAdapter) -> Self {
        Self::with_timeout(artifacts, models, DEFAULT_MODEL_TIMEOUT)
    }

    pub fn with_timeout(
        artifacts: Arc<ArtifactStore>,
        models: RiskModelAdapter,
        model_timeout: Duration,
    ) -> Self {
        let engine = DecisionEngine::new(*artifacts.thresholds());
        Self {
            artifacts,
            models,
            engine,
            model_timeout,
            model_permits: Arc::new(Semaphore::new(DEFAULT_MODEL_CONCURRENCY)),
        }
    }

    /// Caps the number of estimator calls running on blocking threads at once.
    pub fn with_model_concurrency(mut self, limit: usize) -> Self {
        self.model_permits = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn thresholds(&self) -> &Thresholds {
        self.engine.thresholds()
    }

    /// Derive features, score both estimators concurrently, and apply the rule chain.
    ///
    /// Fails without a partial result if either estimator is unavailable; the
    /// error lists every estimator that failed, default risk first.
    pub async fn evaluate(
        &self,
        record: &ApplicantRecord,
    ) -> Result<DecisionOutcome, DecisionServiceError> {
        let derived = FeatureDeriver::derive(record, self.thresholds());
        let default_vector = FeatureDeriver::default_risk_vector(record, &derived);
        let base_vector = FeatureDeriver::base_vector(record, &derived);

        let (default_risk, overindebtedness) = tokio::join!(
            self.run_model(ModelKind::DefaultRisk, move |models| {
                models.score_default_risk(&default_vector)
            }),
            self.run_model(ModelKind::Overindebtedness, move |models| {
                models.score_overindebtedness_risk(&base_vector)
            }),
        );

        let (default_probability, overindebtedness_probability) =
            match (default_risk, overindebtedness) {
                (Ok(default_probability), Ok(overindebtedness_probability)) => {
                    (default_probability, overindebtedness_probability)
                }
                (default_risk, overindebtedness) => {
                    let failures = [default_risk.err(), overindebtedness.err()]
                        .into_iter()
                        .flatten()
                        .collect();
                    return Err(DecisionServiceError::ModelUnavailable(failures));
                }
            };

        Ok(self.engine.decide(
            record,
            &derived,
            RiskScores {
                default_probability,
                overindebtedness_probability,
            },
        ))
    }

    async fn run_model<F>(&self, kind: ModelKind, call: F) -> Result<f64, ModelUnavailable>
    where
        F: FnOnce(&RiskModelAdapter) -> Result<f64, ModelUnavailable> + Send + 'static,
    {
        let models = self.models.clone();
        let permits = Arc::clone(&self.model_permits);

        let scoring = async move {
            let permit = permits.acquire_owned().await.map_err(|_| {
                ModelUnavailable::new(kind, "scoring capacity closed")
            })?;
            tokio::task::spawn_blocking(move || {
                let result = call(&models);
                drop(permit);
                result
            })
            .await
            .map_err(|join_error| {
                ModelUnavailable::new(kind, format!("scoring task failed: {join_error}"))
            })?
        };

        let result = match timeout(self.model_timeout, scoring).await {
            Ok(result) => result,
            Err(_) => Err(ModelUnavailable::new(
                kind,
                format!("scoring timed out after {}ms", self.model_timeout.as_millis()),
            )),
        };

        if let Err(err) = &result {
            tracing::warn!(model = %kind, reason = %err.reason, "risk model call failed");
        }
        result
    }
}

/// Error raised by the decision service.
#[derive(Debug, thiserror::Error)]
pub enum DecisionServiceError {
    /// Every estimator that failed for the request, never empty.
    #[error("{}", describe_failures(.0))]
    ModelUnavailable(Vec<ModelUnavailable>),
}

impl DecisionServiceError {
    pub fn failed_models(&self) -> Vec<ModelKind> {
        match self {
            DecisionServiceError::ModelUnavailable(failures) => {
                failures.iter().map(|failure| failure.model).collect()
            }
        }
    }
}

fn describe_failures(failures: &[ModelUnavailable]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
