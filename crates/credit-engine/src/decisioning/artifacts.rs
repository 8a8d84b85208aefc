use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Policy cutoffs and the income imputation constant used by every decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// Regulatory ceiling on the declared debt ratio.
    pub red_line_debt_ratio: f64,
    pub default_probability_cutoff: f64,
    pub overindebtedness_probability_cutoff: f64,
    /// Median monthly income from the training data.
    pub median_income_imputation: f64,
}

impl Thresholds {
    fn validate(&self) -> Result<(), ArtifactError> {
        let checks = [
            ("redLineDebtRatio", self.red_line_debt_ratio, None),
            (
                "defaultProbabilityCutoff",
                self.default_probability_cutoff,
                Some(1.0),
            ),
            (
                "overindebtednessProbabilityCutoff",
                self.overindebtedness_probability_cutoff,
                Some(1.0),
            ),
            ("medianIncomeImputation", self.median_income_imputation, None),
        ];

        for (field, value, upper) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(ArtifactError::Invalid {
                    field,
                    reason: format!("expected a finite non-negative number, got {value}"),
                });
            }
            if let Some(upper) = upper {
                if value > upper {
                    return Err(ArtifactError::Invalid {
                        field,
                        reason: format!("expected a probability in [0, 1], got {value}"),
                    });
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleFile {
    version: String,
    thresholds: ThresholdSection,
    imputation: ImputationSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThresholdSection {
    red_line_debt_ratio: f64,
    default_probability_cutoff: f64,
    overindebtedness_probability_cutoff: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImputationSection {
    monthly_income: f64,
}

/// Read-only snapshot of the decision artifacts, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactStore {
    version: String,
    thresholds: Thresholds,
    loaded_at: DateTime<Utc>,
}

impl ArtifactStore {
    pub fn new(version: impl Into<String>, thresholds: Thresholds) -> Result<Self, ArtifactError> {
        thresholds.validate()?;
        Ok(Self {
            version: version.into(),
            thresholds,
            loaded_at: Utc::now(),
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file).map_err(|err| err.at(path))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let bundle: BundleFile =
            serde_json::from_reader(reader).map_err(|source| ArtifactError::Parse {
                path: None,
                source,
            })?;

        let thresholds = Thresholds {
            red_line_debt_ratio: bundle.thresholds.red_line_debt_ratio,
            default_probability_cutoff: bundle.thresholds.default_probability_cutoff,
            overindebtedness_probability_cutoff: bundle
                .thresholds
                .overindebtedness_probability_cutoff,
            median_income_imputation: bundle.imputation.monthly_income,
        };

        Self::new(bundle.version, thresholds)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// The artifact bundle could not be loaded; the service must not become ready.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("configuration unavailable: cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("configuration unavailable: malformed artifact bundle{}: {source}", display_path(.path))]
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    #[error("configuration unavailable: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ArtifactError {
    fn at(self, location: &Path) -> Self {
        match self {
            ArtifactError::Parse { path: None, source } => ArtifactError::Parse {
                path: Some(location.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" at {}", path.display()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BUNDLE: &str = r#"{
        "version": "2024.06-lei14181",
        "thresholds": {
            "redLineDebtRatio": 0.5,
            "defaultProbabilityCutoff": 0.6,
            "overindebtednessProbabilityCutoff": 0.55
        },
        "imputation": { "monthlyIncome": 5400.0 }
    }"#;

    #[test]
    fn loads_thresholds_and_imputation() {
        let store = ArtifactStore::from_reader(BUNDLE.as_bytes()).expect("bundle loads");
        assert_eq!(store.version(), "2024.06-lei14181");
        let thresholds = store.thresholds();
        assert_eq!(thresholds.red_line_debt_ratio, 0.5);
        assert_eq!(thresholds.default_probability_cutoff, 0.6);
        assert_eq!(thresholds.overindebtedness_probability_cutoff, 0.55);
        assert_eq!(thresholds.median_income_imputation, 5400.0);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(BUNDLE.as_bytes()).expect("write bundle");
        let store = ArtifactStore::from_path(file.path()).expect("bundle loads");
        assert_eq!(store.thresholds().median_income_imputation, 5400.0);
    }

    #[test]
    fn missing_file_is_configuration_unavailable() {
        let err = ArtifactStore::from_path("/nonexistent/credit/bundle.json")
            .expect_err("missing bundle fails");
        assert!(matches!(err, ArtifactError::Read { .. }));
        assert!(err.to_string().starts_with("configuration unavailable"));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ \"version\": ").expect("write bundle");
        let err = ArtifactStore::from_path(file.path()).expect_err("parse fails");
        match err {
            ArtifactError::Parse { path: Some(path), .. } => assert_eq!(path, file.path()),
            other => panic!("expected parse error with path, got {other:?}"),
        }
    }

    #[test]
    fn rejects_cutoff_outside_unit_interval() {
        let bundle = BUNDLE.replace("0.6,", "1.6,");
        let err = ArtifactStore::from_reader(bundle.as_bytes()).expect_err("cutoff rejected");
        match err {
            ArtifactError::Invalid { field, .. } => assert_eq!(field, "defaultProbabilityCutoff"),
            other => panic!("expected invalid cutoff, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_median_income() {
        let bundle = BUNDLE.replace("5400.0", "-1.0");
        let err = ArtifactStore::from_reader(bundle.as_bytes()).expect_err("median rejected");
        assert!(matches!(
            err,
            ArtifactError::Invalid {
                field: "medianIncomeImputation",
                ..
            }
        ));
    }
}
