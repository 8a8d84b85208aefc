use crate::infra::build_decision_service;
use clap::Args;
use credit_engine::config::AppConfig;
use credit_engine::decisioning::{
    ApplicantRecord, ArtifactStore, BatchImporter, BatchSummary, CreditDecisionService, Decision,
    DecisionOutcome, FixedProbabilityModel, RiskModelAdapter, Thresholds,
};
use credit_engine::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DecideArgs {
    /// JSON file holding one applicant record
    #[arg(long)]
    pub(crate) input: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export using the training-data column headers
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Print only the label totals
    #[arg(long)]
    pub(crate) summary_only: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print each outcome as JSON instead of a table row
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_decide(args: DecideArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_decision_service(&config.artifacts)?;

    let raw = std::fs::read_to_string(&args.input)?;
    let record: ApplicantRecord = serde_json::from_str(&raw)?;
    let outcome = service.evaluate(&record).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub(crate) async fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_decision_service(&config.artifacts)?;
    let records = BatchImporter::from_path(&args.csv)?;

    let mut summary = BatchSummary::default();
    for (index, record) in records.iter().enumerate() {
        match service.evaluate(record).await {
            Ok(outcome) => {
                if !args.summary_only {
                    println!("{}", render_row(&format!("row {}", index + 1), &outcome));
                }
                summary.record(&outcome);
            }
            Err(err) => {
                if !args.summary_only {
                    println!("row {}: {err}", index + 1);
                }
                summary.record_failure();
            }
        }
    }

    println!("\nScored {} applicant(s) from {}", summary.total(), args.csv.display());
    for decision in Decision::ordered() {
        println!("- {}: {}", decision.label(), summary.count(decision));
    }
    if summary.failures() > 0 {
        println!("- MODEL_UNAVAILABLE: {}", summary.failures());
    }

    Ok(())
}

struct Scenario {
    name: &'static str,
    debt_ratio: f64,
    default_probability: f64,
    overindebtedness_probability: f64,
}

const SCENARIOS: [Scenario; 4] = [
    Scenario {
        name: "A: declared over-commitment",
        debt_ratio: 0.70,
        default_probability: 0.05,
        overindebtedness_probability: 0.05,
    },
    Scenario {
        name: "B: historical default risk",
        debt_ratio: 0.30,
        default_probability: 0.75,
        overindebtedness_probability: 0.10,
    },
    Scenario {
        name: "C: over-indebtedness profile",
        debt_ratio: 0.30,
        default_probability: 0.40,
        overindebtedness_probability: 0.80,
    },
    Scenario {
        name: "D: healthy applicant",
        debt_ratio: 0.20,
        default_probability: 0.10,
        overindebtedness_probability: 0.10,
    },
];

fn demo_thresholds() -> Thresholds {
    Thresholds {
        red_line_debt_ratio: 0.50,
        default_probability_cutoff: 0.60,
        overindebtedness_probability_cutoff: 0.55,
        median_income_imputation: 5400.0,
    }
}

fn demo_applicant(debt_ratio: f64) -> ApplicantRecord {
    ApplicantRecord {
        revolving_utilization: 0.35,
        age: 39,
        late_30_59: 0,
        monthly_income: None,
        open_credit_lines: 7,
        late_90_plus: 0,
        real_estate_loans: 1,
        late_60_89: 0,
        dependents: Some(2.0),
        debt_ratio,
    }
}

async fn run_scenario(scenario: &Scenario) -> Result<DecisionOutcome, AppError> {
    let store = Arc::new(ArtifactStore::new("demo", demo_thresholds())?);
    let service = CreditDecisionService::new(
        store,
        RiskModelAdapter::new(
            Arc::new(FixedProbabilityModel(scenario.default_probability)),
            Arc::new(FixedProbabilityModel(scenario.overindebtedness_probability)),
        ),
    );
    Ok(service.evaluate(&demo_applicant(scenario.debt_ratio)).await?)
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let thresholds = demo_thresholds();
    println!("Responsible credit engine demo");
    println!(
        "Cutoffs: red line {:.2}, default {:.2}, over-indebtedness {:.2}",
        thresholds.red_line_debt_ratio,
        thresholds.default_probability_cutoff,
        thresholds.overindebtedness_probability_cutoff
    );
    println!();

    for scenario in &SCENARIOS {
        let outcome = run_scenario(scenario).await?;
        if args.json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            println!("{}", render_row(scenario.name, &outcome));
        }
    }

    Ok(())
}

fn render_row(name: &str, outcome: &DecisionOutcome) -> String {
    format!(
        "{name} | {} | {} | p_default {:.4} | p_overindebtedness {:.4} | debt ratio {} | {}",
        outcome.decision.label(),
        outcome.signal.label(),
        outcome.technical.default_probability,
        outcome.technical.overindebtedness_probability,
        outcome.technical.declared_debt_ratio,
        outcome.justification
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_engine::decisioning::Signal;

    #[tokio::test]
    async fn demo_scenarios_cover_each_rule() {
        let mut decisions = Vec::new();
        for scenario in &SCENARIOS {
            let outcome = run_scenario(scenario).await.expect("scenario runs");
            decisions.push((outcome.decision, outcome.signal));
        }

        assert_eq!(
            decisions,
            vec![
                (Decision::AlertDeclaredData, Signal::Yellow),
                (Decision::Denied, Signal::Red),
                (Decision::AlertRiskProfile, Signal::Yellow),
                (Decision::Approved, Signal::Green),
            ]
        );
    }

    #[test]
    fn rendered_row_carries_label_and_signal() {
        let outcome = DecisionOutcome {
            decision: Decision::Denied,
            signal: Signal::Red,
            justification: "High default risk.".to_string(),
            technical: credit_engine::decisioning::TechnicalAnalysis {
                default_probability: 0.75,
                overindebtedness_probability: 0.1,
                declared_debt_ratio: 0.3,
            },
        };

        let row = render_row("B", &outcome);
        assert!(row.starts_with("B | DENIED | RED"));
        assert!(row.contains("p_default 0.7500"));
    }
}
