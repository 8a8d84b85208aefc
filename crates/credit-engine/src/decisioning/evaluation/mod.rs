mod policy;

pub use policy::OVERINDEBTEDNESS_STATUTE;

use super::artifacts::Thresholds;
use super::domain::{
    round4, ApplicantRecord, DecisionOutcome, DerivedFeatures, RiskScores, TechnicalAnalysis,
};
use policy::decide_outcome;

/// Stateless evaluator that applies the decision policy to one applicant.
#[derive(Debug, Clone, Copy)]
pub struct DecisionEngine {
    thresholds: Thresholds,
}

impl DecisionEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Decide on a record once both probabilities are known.
    ///
    /// The derived features do not take part in the rule chain; they are accepted
    /// so callers hand over the full evaluation context and can log it together.
    pub fn decide(
        &self,
        record: &ApplicantRecord,
        derived: &DerivedFeatures,
        scores: RiskScores,
    ) -> DecisionOutcome {
        let (decision, justification) = decide_outcome(record, &scores, &self.thresholds);

        tracing::debug!(
            decision = decision.label(),
            signal = decision.signal().label(),
            default_probability = scores.default_probability,
            overindebtedness_probability = scores.overindebtedness_probability,
            declared_debt_ratio = record.debt_ratio,
            clamped_debt_ratio = derived.clamped_debt_ratio,
            "credit decision evaluated"
        );

        DecisionOutcome {
            decision,
            signal: decision.signal(),
            justification,
            technical: TechnicalAnalysis {
                default_probability: round4(scores.default_probability),
                overindebtedness_probability: round4(scores.overindebtedness_probability),
                declared_debt_ratio: record.debt_ratio,
            },
        }
    }
}
