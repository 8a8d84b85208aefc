//! Credit decisioning: feature derivation, risk scoring, and the rule chain that
//! reconciles the over-indebtedness statute with both model probabilities.

pub mod artifacts;
pub mod batch;
pub mod domain;
pub(crate) mod evaluation;
pub mod features;
pub mod models;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use artifacts::{ArtifactError, ArtifactStore, Thresholds};
pub use batch::{BatchImportError, BatchImporter, BatchSummary};
pub use domain::{
    ApplicantRecord, Decision, DecisionOutcome, DerivedFeatures, RiskScores, Signal,
    TechnicalAnalysis,
};
pub use evaluation::{DecisionEngine, OVERINDEBTEDNESS_STATUTE};
pub use features::FeatureDeriver;
pub use models::{
    FixedProbabilityModel, LogisticRiskModel, ModelKind, ModelUnavailable, RiskModel,
    RiskModelAdapter, UnavailableModel,
};
pub use router::decision_router;
pub use service::{CreditDecisionService, DecisionServiceError};
