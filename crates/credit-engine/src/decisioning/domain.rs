use serde::{Deserialize, Serialize};

/// Raw applicant data as declared on the credit request.
///
/// Numeric fields are not range-checked; negative counts or ages flow through
/// derivation unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRecord {
    pub revolving_utilization: f64,
    pub age: i64,
    #[serde(rename = "lateBand_30_59")]
    pub late_30_59: i64,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    pub open_credit_lines: i64,
    #[serde(rename = "lateBand_90plus")]
    pub late_90_plus: i64,
    pub real_estate_loans: i64,
    #[serde(rename = "lateBand_60_89")]
    pub late_60_89: i64,
    #[serde(default)]
    pub dependents: Option<f64>,
    /// Self-reported share of income committed to debt. Values above 1 are legal.
    pub debt_ratio: f64,
}

/// Canonical feature set computed from an [`ApplicantRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFeatures {
    pub effective_income: f64,
    pub dependents: f64,
    pub per_capita_income: f64,
    pub total_delinquency: i64,
    pub critical_utilization: u8,
    pub clamped_debt_ratio: f64,
}

/// Final adjudication label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approved,
    Denied,
    AlertDeclaredData,
    AlertRiskProfile,
}

impl Decision {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Approved,
            Self::Denied,
            Self::AlertDeclaredData,
            Self::AlertRiskProfile,
        ]
    }

    pub const fn signal(self) -> Signal {
        match self {
            Self::Approved => Signal::Green,
            Self::Denied => Signal::Red,
            Self::AlertDeclaredData | Self::AlertRiskProfile => Signal::Yellow,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
            Self::AlertDeclaredData => "ALERT_DECLARED_DATA",
            Self::AlertRiskProfile => "ALERT_RISK_PROFILE",
        }
    }
}

/// Traffic-light summary of decision severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Green,
    Yellow,
    Red,
}

impl Signal {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

/// Model scores and the raw declared ratio, reported alongside every decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAnalysis {
    pub default_probability: f64,
    pub overindebtedness_probability: f64,
    pub declared_debt_ratio: f64,
}

/// Auditable result of one credit evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub decision: Decision,
    pub signal: Signal,
    pub justification: String,
    pub technical: TechnicalAnalysis,
}

/// The pair of probabilities a decision is built from. Both are always present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScores {
    pub default_probability: f64,
    pub overindebtedness_probability: f64,
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn applicant_record_reads_canonical_field_names() {
        let record: ApplicantRecord = serde_json::from_value(json!({
            "revolvingUtilization": 0.42,
            "age": 37,
            "lateBand_30_59": 1,
            "openCreditLines": 6,
            "lateBand_90plus": 0,
            "realEstateLoans": 1,
            "lateBand_60_89": 0,
            "debtRatio": 0.31
        }))
        .expect("record parses");

        assert_eq!(record.monthly_income, None);
        assert_eq!(record.dependents, None);
        assert_eq!(record.late_30_59, 1);
        assert_eq!(record.debt_ratio, 0.31);
    }

    #[test]
    fn decision_labels_serialize_canonically() {
        let labels: Vec<String> = Decision::ordered()
            .iter()
            .map(|decision| serde_json::to_value(decision).expect("serializes"))
            .map(|value| value.as_str().expect("string").to_string())
            .collect();
        let expected: Vec<String> = Decision::ordered()
            .iter()
            .map(|decision| decision.label().to_string())
            .collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn signal_is_a_function_of_decision() {
        assert_eq!(Decision::Approved.signal(), Signal::Green);
        assert_eq!(Decision::Denied.signal(), Signal::Red);
        assert_eq!(Decision::AlertDeclaredData.signal(), Signal::Yellow);
        assert_eq!(Decision::AlertRiskProfile.signal(), Signal::Yellow);
    }

    #[test]
    fn round4_keeps_four_decimals() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.75), 0.75);
    }
}
