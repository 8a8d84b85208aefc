use super::super::artifacts::Thresholds;
use super::super::domain::{ApplicantRecord, Decision, RiskScores};

/// Statute protecting consumers against over-indebtedness.
pub const OVERINDEBTEDNESS_STATUTE: &str = "Law 14.181/2021";

/// Priority-ordered rule chain. The first matching rule wins:
/// regulatory compliance, then lender protection, then borrower protection.
/// Every comparison is strict, so a value equal to its cutoff falls through.
pub(crate) fn decide_outcome(
    record: &ApplicantRecord,
    scores: &RiskScores,
    thresholds: &Thresholds,
) -> (Decision, String) {
    // Declared data only; no model score can override this rule.
    if record.debt_ratio > thresholds.red_line_debt_ratio {
        return (
            Decision::AlertDeclaredData,
            format!(
                "Applicant declared {:.0}% of income committed to debt. \
                 Direct violation of the over-indebtedness prevention statute ({}).",
                record.debt_ratio * 100.0,
                OVERINDEBTEDNESS_STATUTE
            ),
        );
    }

    if scores.default_probability > thresholds.default_probability_cutoff {
        return (
            Decision::Denied,
            "High default risk detected by the historical credit model.".to_string(),
        );
    }

    if scores.overindebtedness_probability > thresholds.overindebtedness_probability_cutoff {
        return (
            Decision::AlertRiskProfile,
            "Financial behavior indicates a high risk of future over-indebtedness.".to_string(),
        );
    }

    (Decision::Approved, "Healthy applicant profile.".to_string())
}
