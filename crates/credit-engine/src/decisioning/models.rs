use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::features::{BASE_FEATURES, DEFAULT_RISK_FEATURES};

/// Identifies which estimator produced (or failed to produce) a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    DefaultRisk,
    Overindebtedness,
}

impl ModelKind {
    pub const fn key(self) -> &'static str {
        match self {
            Self::DefaultRisk => "default_risk",
            Self::Overindebtedness => "overindebtedness",
        }
    }

    /// Column names the estimator was trained on, in order.
    pub fn expected_features(self) -> &'static [&'static str] {
        match self {
            Self::DefaultRisk => &DEFAULT_RISK_FEATURES,
            Self::Overindebtedness => &BASE_FEATURES,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A scoring capability failed; no decision can be produced without it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{model} model unavailable: {reason}")]
pub struct ModelUnavailable {
    pub model: ModelKind,
    pub reason: String,
}

impl ModelUnavailable {
    pub fn new(model: ModelKind, reason: impl Into<String>) -> Self {
        Self {
            model,
            reason: reason.into(),
        }
    }
}

/// Opaque probability estimator.
///
/// Implementations may be slow; callers run them off the async executor.
pub trait RiskModel: Send + Sync {
    fn score(&self, features: &[f64]) -> Result<f64, ModelUnavailable>;
}

/// Logistic estimator exported from training as intercept plus coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRiskModel {
    kind: ModelKind,
    intercept: f64,
    coefficients: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct LogisticArtifact {
    features: Vec<String>,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LogisticRiskModel {
    pub fn new(
        kind: ModelKind,
        intercept: f64,
        coefficients: Vec<f64>,
    ) -> Result<Self, ModelUnavailable> {
        let expected = kind.expected_features().len();
        if coefficients.len() != expected {
            return Err(ModelUnavailable::new(
                kind,
                format!(
                    "expected {expected} coefficients, artifact has {}",
                    coefficients.len()
                ),
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|value| !value.is_finite()) {
            return Err(ModelUnavailable::new(kind, "artifact has non-finite weights"));
        }

        Ok(Self {
            kind,
            intercept,
            coefficients,
        })
    }

    pub fn from_path<P: AsRef<Path>>(kind: ModelKind, path: P) -> Result<Self, ModelUnavailable> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| {
            ModelUnavailable::new(kind, format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_reader(kind, file)
    }

    pub fn from_reader<R: Read>(kind: ModelKind, reader: R) -> Result<Self, ModelUnavailable> {
        let artifact: LogisticArtifact = serde_json::from_reader(reader)
            .map_err(|err| ModelUnavailable::new(kind, format!("malformed artifact: {err}")))?;

        let expected = kind.expected_features();
        if artifact.features.iter().map(String::as_str).ne(expected.iter().copied()) {
            return Err(ModelUnavailable::new(
                kind,
                format!(
                    "feature order {:?} does not match training order {:?}",
                    artifact.features, expected
                ),
            ));
        }

        Self::new(kind, artifact.intercept, artifact.coefficients)
    }

}

impl RiskModel for LogisticRiskModel {
    fn score(&self, features: &[f64]) -> Result<f64, ModelUnavailable> {
        if features.len() != self.coefficients.len() {
            return Err(ModelUnavailable::new(
                self.kind,
                format!(
                    "malformed vector: expected {} features, got {}",
                    self.coefficients.len(),
                    features.len()
                ),
            ));
        }

        let logit = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();
        let probability = 1.0 / (1.0 + (-logit).exp());

        if probability.is_finite() {
            Ok(probability)
        } else {
            Err(ModelUnavailable::new(
                self.kind,
                format!("non-finite score for logit {logit}"),
            ))
        }
    }
}

/// Returns the same probability for every vector. Used for fixtures and demos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedProbabilityModel(pub f64);

impl RiskModel for FixedProbabilityModel {
    fn score(&self, _features: &[f64]) -> Result<f64, ModelUnavailable> {
        Ok(self.0)
    }
}

/// Stands in for an estimator whose artifact failed to load.
#[derive(Debug, Clone, PartialEq)]
pub struct UnavailableModel(pub ModelUnavailable);

impl RiskModel for UnavailableModel {
    fn score(&self, _features: &[f64]) -> Result<f64, ModelUnavailable> {
        Err(self.0.clone())
    }
}

/// Pairs the two estimators behind the scoring contract.
#[derive(Clone)]
pub struct RiskModelAdapter {
    default_risk: Arc<dyn RiskModel>,
    overindebtedness: Arc<dyn RiskModel>,
}

impl RiskModelAdapter {
    pub fn new(default_risk: Arc<dyn RiskModel>, overindebtedness: Arc<dyn RiskModel>) -> Self {
        Self {
            default_risk,
            overindebtedness,
        }
    }

    /// Loads both logistic artifacts. A failed load yields an [`UnavailableModel`]
    /// so the failure is reported on every request instead of aborting startup.
    pub fn load<P, Q>(default_risk_path: P, overindebtedness_path: Q) -> Self
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        Self::new(
            load_or_unavailable(ModelKind::DefaultRisk, default_risk_path.as_ref()),
            load_or_unavailable(ModelKind::Overindebtedness, overindebtedness_path.as_ref()),
        )
    }

    pub fn score_default_risk(&self, features: &[f64]) -> Result<f64, ModelUnavailable> {
        checked(ModelKind::DefaultRisk, self.default_risk.score(features))
    }

    pub fn score_overindebtedness_risk(&self, features: &[f64]) -> Result<f64, ModelUnavailable> {
        checked(
            ModelKind::Overindebtedness,
            self.overindebtedness.score(features),
        )
    }
}

fn load_or_unavailable(kind: ModelKind, path: &Path) -> Arc<dyn RiskModel> {
    match LogisticRiskModel::from_path(kind, path) {
        Ok(model) => {
            tracing::info!(model = %kind, path = %path.display(), "risk model loaded");
            Arc::new(model)
        }
        Err(err) => {
            tracing::warn!(model = %kind, error = %err, "risk model failed to load");
            Arc::new(UnavailableModel(err))
        }
    }
}

/// Rejects estimator output outside the probability range.
fn checked(
    kind: ModelKind,
    result: Result<f64, ModelUnavailable>,
) -> Result<f64, ModelUnavailable> {
    let probability = result?;
    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(ModelUnavailable::new(
            kind,
            format!("probability {probability} outside [0, 1]"),
        ))
    }
}
