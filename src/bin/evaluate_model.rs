//! Evaluate pre-scored validation leads against the standard and CPL baselines
//!
//! Prints the per-lead-score breakdown and the perfect-prediction bound, and
//! optionally runs the production gate.

use anyhow::{Context, Result};
use clap::Parser;
use lead_viability::comparison::{best_case_range, calculate_best_case};
use lead_viability::residuals::{CsvModelRouter, CsvRevenueSource};
use lead_viability::validation::{load_validation_set, TargetColumns};
use lead_viability::{
    EvaluationRequest, EvaluatorConfig, LeadScoreRange, ModelEvaluator, ModelKind, ProductionGate,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Evaluate lead-scoring predictions against standard and CPL routing")]
struct Args {
    /// Validation CSV: LEAD_SCORE, features, label and CPL revenue columns
    #[arg(long)]
    validation: PathBuf,

    /// Scored export with PREDICTION and optional MIN_PREDICTION, row-aligned
    #[arg(long)]
    scores: PathBuf,

    /// classifier or regressor
    #[arg(long, default_value = "regressor")]
    kind: ModelKind,

    #[arg(long, default_value = "standard")]
    segment: String,

    #[arg(long, default_value_t = 8)]
    min_lead_score: i32,

    #[arg(long, default_value_t = 10)]
    max_lead_score: i32,

    #[arg(long, default_value = "ys")]
    label_column: String,

    #[arg(long, default_value = "ys_cpl")]
    cpl_column: String,

    /// Dollar revenue file (`ys` column), required for classifiers
    #[arg(long)]
    revenue: Option<PathBuf>,

    #[arg(long, default_value = "ys")]
    revenue_column: String,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the evaluation result as JSON
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run the production gate after evaluating
    #[arg(long)]
    gate: bool,

    /// Reference rev per opp for the gate (overrides the config file)
    #[arg(long)]
    reference: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let config = EvaluatorConfig::load_or_default(args.config.as_deref()).context("Failed to load config")?;

    let targets = TargetColumns {
        label: args.label_column.clone(),
        cpl_revenue: args.cpl_column.clone(),
    };
    let data = load_validation_set(&args.validation, &targets)
        .with_context(|| format!("Failed to load {}", args.validation.display()))?;
    println!("Loaded {} validation rows in {:?}", data.len(), start.elapsed());

    let router = CsvModelRouter::from_path(&args.scores)
        .with_context(|| format!("Failed to load {}", args.scores.display()))?;
    let mut evaluator = ModelEvaluator::new(Box::new(router)).with_settings(config.comparison_settings());
    if let Some(path) = &args.revenue {
        evaluator = evaluator.with_revenue_source(Box::new(
            CsvRevenueSource::new(path).with_column(args.revenue_column.clone()),
        ));
    }

    let request = EvaluationRequest {
        segment: args.segment.clone(),
        min_prediction: None,
        lead_scores: LeadScoreRange::new(args.min_lead_score, args.max_lead_score)?,
        kind: args.kind,
    };

    let table = evaluator.analysis_table(&data, None, &request)?;
    let result = evaluator.evaluate_table(&table, None, request.lead_scores)?;

    println!("\n=== {} {} evaluation ===", args.segment, args.kind);
    println!(
        "{:<6} {:>6} {:>7} {:>9} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Score", "Opps", "Worked", "Filtered", "Bart/Opp", "Std/Opp", "vs Std", "CPL/Opp", "vs CPL"
    );
    for (lead_score, standard) in &result.lead_scores.standard {
        let cpl = &result.lead_scores.cpl[lead_score];
        println!(
            "{:<6} {:>6} {:>7} {:>8.1}% {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            lead_score,
            standard.num_opps,
            standard.worked,
            standard.pct_filtered_out * 100.0,
            standard.bart_rev_per_opp,
            standard.baseline_rev_per_opp,
            standard.rev_per_opp_improvement,
            cpl.baseline_rev_per_opp,
            cpl.rev_per_opp_improvement,
        );
    }
    println!("Net vs standard: {:.2}", result.net_vs_standard);
    println!("Net vs CPL:      {:.2}", result.net_vs_cpl);
    if args.kind == ModelKind::Regressor {
        println!("Mean absolute error: {:.2}", table.mean_absolute_error());
    }

    println!("\n=== Best case (perfect prediction) ===");
    println!("{:<6} {:>6} {:>12} {:>12}", "Score", "Opps", "Perfect/Opp", "CPL/Opp");
    for (lead_score, best) in calculate_best_case(&table, best_case_range()) {
        println!(
            "{:<6} {:>6} {:>12.2} {:>12.2}",
            lead_score, best.num_opps, best.perfect_rev_per_opp, best.baseline_rev_per_opp
        );
    }

    if let Some(path) = &args.output {
        let writer = BufWriter::new(File::create(path).context("Failed to create output file")?);
        serde_json::to_writer_pretty(writer, &result)?;
        println!("\nResult written to {}", path.display());
    }

    if args.gate {
        let mut gate = ProductionGate::new(config.gate.clone());
        if let Some(reference) = args.reference {
            gate = gate.with_reference(reference);
        }
        println!("\n=== Production gate ===");
        gate.check_table(&evaluator, &table)?;
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
