use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{ApplicantRecord, Decision, DecisionOutcome};

/// Reads applicant rows from a CSV export that uses the training-data headers.
///
/// Unknown columns (row index, target label) are ignored. Empty or `NA`
/// cells in the income and dependents columns become "not reported".
pub struct BatchImporter;

impl BatchImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ApplicantRecord>, BatchImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ApplicantRecord>, BatchImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for row in csv_reader.deserialize::<TrainingRow>() {
            records.push(row?.into());
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct TrainingRow {
    #[serde(
        rename = "RevolvingUtilizationOfUnsecuredLines",
        deserialize_with = "finite_number"
    )]
    revolving_utilization: f64,
    #[serde(rename = "age")]
    age: i64,
    #[serde(rename = "NumberOfTime30-59DaysPastDueNotWorse")]
    late_30_59: i64,
    #[serde(rename = "DebtRatio", deserialize_with = "finite_number")]
    debt_ratio: f64,
    #[serde(rename = "MonthlyIncome", default, deserialize_with = "optional_number")]
    monthly_income: Option<f64>,
    #[serde(rename = "NumberOfOpenCreditLinesAndLoans")]
    open_credit_lines: i64,
    #[serde(rename = "NumberOfTimes90DaysLate")]
    late_90_plus: i64,
    #[serde(rename = "NumberRealEstateLoansOrLines")]
    real_estate_loans: i64,
    #[serde(rename = "NumberOfTime60-89DaysPastDueNotWorse")]
    late_60_89: i64,
    #[serde(rename = "NumberOfDependents", default, deserialize_with = "optional_number")]
    dependents: Option<f64>,
}

impl From<TrainingRow> for ApplicantRecord {
    fn from(row: TrainingRow) -> Self {
        ApplicantRecord {
            revolving_utilization: row.revolving_utilization,
            age: row.age,
            late_30_59: row.late_30_59,
            monthly_income: row.monthly_income,
            open_credit_lines: row.open_credit_lines,
            late_90_plus: row.late_90_plus,
            real_estate_loans: row.real_estate_loans,
            late_60_89: row.late_60_89,
            dependents: row.dependents,
            debt_ratio: row.debt_ratio,
        }
    }
}

fn finite_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_finite(raw.trim()).map_err(serde::de::Error::custom)
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("na") => Ok(None),
        Some(value) => parse_finite(value).map(Some).map_err(serde::de::Error::custom),
    }
}

/// `f64::from_str` accepts `NaN` and `inf`; those cells fail the row instead.
fn parse_finite(value: &str) -> Result<f64, String> {
    let number = value
        .parse::<f64>()
        .map_err(|err| format!("'{value}' is not a number ({err})"))?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(format!("'{value}' is not a finite number"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchImportError {
    #[error("failed to read applicant export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applicant CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Decision counts for a scored batch, keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    counts: BTreeMap<&'static str, usize>,
    failures: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &DecisionOutcome) {
        *self.counts.entry(outcome.decision.label()).or_insert(0) += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn count(&self, decision: Decision) -> usize {
        self.counts.get(decision.label()).copied().unwrap_or(0)
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum::<usize>() + self.failures
    }
}
