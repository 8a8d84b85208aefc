use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::decisioning::artifacts::{ArtifactStore, Thresholds};
use crate::decisioning::domain::ApplicantRecord;
use crate::decisioning::evaluation::DecisionEngine;
use crate::decisioning::models::{
    FixedProbabilityModel, ModelKind, ModelUnavailable, RiskModel, RiskModelAdapter,
    UnavailableModel,
};
use crate::decisioning::service::CreditDecisionService;

/// Cutoffs used throughout the reference scenarios.
pub(super) fn thresholds() -> Thresholds {
    Thresholds {
        red_line_debt_ratio: 0.50,
        default_probability_cutoff: 0.60,
        overindebtedness_probability_cutoff: 0.55,
        median_income_imputation: 5400.0,
    }
}

pub(super) fn artifacts() -> Arc<ArtifactStore> {
    Arc::new(ArtifactStore::new("test-bundle", thresholds()).expect("thresholds valid"))
}

pub(super) fn decision_engine() -> DecisionEngine {
    DecisionEngine::new(thresholds())
}

pub(super) fn applicant(debt_ratio: f64) -> ApplicantRecord {
    ApplicantRecord {
        revolving_utilization: 0.28,
        age: 38,
        late_30_59: 0,
        monthly_income: Some(7200.0),
        open_credit_lines: 6,
        late_90_plus: 0,
        real_estate_loans: 1,
        late_60_89: 0,
        dependents: Some(1.0),
        debt_ratio,
    }
}

pub(super) fn fixed_service(default_risk: f64, overindebtedness: f64) -> CreditDecisionService {
    CreditDecisionService::new(
        artifacts(),
        RiskModelAdapter::new(
            Arc::new(FixedProbabilityModel(default_risk)),
            Arc::new(FixedProbabilityModel(overindebtedness)),
        ),
    )
}

pub(super) fn service_with(
    default_risk: Arc<dyn RiskModel>,
    overindebtedness: Arc<dyn RiskModel>,
) -> CreditDecisionService {
    CreditDecisionService::with_timeout(
        artifacts(),
        RiskModelAdapter::new(default_risk, overindebtedness),
        Duration::from_millis(200),
    )
}

pub(super) fn unavailable(kind: ModelKind) -> Arc<dyn RiskModel> {
    Arc::new(UnavailableModel(ModelUnavailable::new(
        kind,
        "artifact not loaded",
    )))
}

/// Records every vector it is asked to score.
#[derive(Default)]
pub(super) struct RecordingModel {
    pub(super) probability: f64,
    pub(super) calls: AtomicUsize,
    pub(super) last_vector: std::sync::Mutex<Vec<f64>>,
}

impl RecordingModel {
    pub(super) fn new(probability: f64) -> Self {
        Self {
            probability,
            ..Self::default()
        }
    }

    pub(super) fn last_vector(&self) -> Vec<f64> {
        self.last_vector.lock().expect("vector mutex poisoned").clone()
    }
}

impl RiskModel for RecordingModel {
    fn score(&self, features: &[f64]) -> Result<f64, ModelUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_vector.lock().expect("vector mutex poisoned") = features.to_vec();
        Ok(self.probability)
    }
}

/// Blocks long enough to exceed the service timeout, counting calls that started.
pub(super) struct SlowModel {
    delay: Duration,
    pub(super) started: AtomicUsize,
}

impl SlowModel {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: AtomicUsize::new(0),
        }
    }
}

impl RiskModel for SlowModel {
    fn score(&self, _features: &[f64]) -> Result<f64, ModelUnavailable> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(0.1)
    }
}
