//! Deterministic derivation of model inputs from an applicant record.
//!
//! Both estimators were trained on the same twelve base columns in a fixed
//! order. The default-risk estimator additionally takes the clamped debt ratio
//! as its thirteenth column; the over-indebtedness estimator never sees the
//! debt ratio so its signal stays independent of the regulatory rule.

use super::artifacts::Thresholds;
use super::domain::{ApplicantRecord, DerivedFeatures};

/// Upper bound applied to the declared debt ratio before it reaches the default-risk model.
pub const DEBT_RATIO_CLAMP: f64 = 2.0;

/// Utilization at or above this value marks an over-limit revolving account.
pub const CRITICAL_UTILIZATION: f64 = 1.0;

/// Column order shared by both estimators.
pub const BASE_FEATURES: [&str; 12] = [
    "revolving_utilization",
    "age",
    "late_30_59",
    "monthly_income",
    "open_credit_lines",
    "late_90_plus",
    "real_estate_loans",
    "late_60_89",
    "dependents",
    "per_capita_income",
    "total_delinquency",
    "critical_utilization",
];

/// Column order for the default-risk estimator.
pub const DEFAULT_RISK_FEATURES: [&str; 13] = [
    "revolving_utilization",
    "age",
    "late_30_59",
    "monthly_income",
    "open_credit_lines",
    "late_90_plus",
    "real_estate_loans",
    "late_60_89",
    "dependents",
    "per_capita_income",
    "total_delinquency",
    "critical_utilization",
    "debt_ratio_clamped",
];

pub struct FeatureDeriver;

impl FeatureDeriver {
    pub fn derive(record: &ApplicantRecord, thresholds: &Thresholds) -> DerivedFeatures {
        // Zero income is treated exactly like a missing declaration.
        let effective_income = match record.monthly_income {
            Some(income) if income != 0.0 => income,
            _ => thresholds.median_income_imputation,
        };
        let dependents = record.dependents.unwrap_or(0.0);

        DerivedFeatures {
            effective_income,
            dependents,
            per_capita_income: effective_income / (dependents + 1.0),
            total_delinquency: record.late_30_59 + record.late_60_89 + record.late_90_plus,
            critical_utilization: u8::from(record.revolving_utilization >= CRITICAL_UTILIZATION),
            clamped_debt_ratio: record.debt_ratio.min(DEBT_RATIO_CLAMP),
        }
    }

    /// Base vector in training order, as fed to the over-indebtedness estimator.
    pub fn base_vector(record: &ApplicantRecord, derived: &DerivedFeatures) -> Vec<f64> {
        vec![
            record.revolving_utilization,
            record.age as f64,
            record.late_30_59 as f64,
            derived.effective_income,
            record.open_credit_lines as f64,
            record.late_90_plus as f64,
            record.real_estate_loans as f64,
            record.late_60_89 as f64,
            derived.dependents,
            derived.per_capita_income,
            derived.total_delinquency as f64,
            f64::from(derived.critical_utilization),
        ]
    }

    /// Base vector with the clamped debt ratio appended.
    pub fn default_risk_vector(record: &ApplicantRecord, derived: &DerivedFeatures) -> Vec<f64> {
        let mut vector = Self::base_vector(record, derived);
        vector.push(derived.clamped_debt_ratio);
        vector
    }
}
