//! Search the minimum prediction and lead score range that maximize net
//! revenue per opp over recent history

use anyhow::{Context, Result};
use clap::Parser;
use lead_viability::optimizer::{optimize, TrialRecord};
use lead_viability::validation::load_history;
use lead_viability::EvaluatorConfig;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Search work thresholds over historical scored leads")]
struct Args {
    /// CSV with CREATED_DATE, LEAD_SCORE, ACTUAL, PREDICTED, CPL_REV
    #[arg(long)]
    history: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only use history on or after this date (YYYY-MM-DD)
    #[arg(long)]
    date_cutoff: Option<String>,

    #[arg(long)]
    n_trials: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Write every trial to this CSV
    #[arg(long)]
    trials_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let mut config = EvaluatorConfig::load_or_default(args.config.as_deref()).context("Failed to load config")?;
    if let Some(cutoff) = args.date_cutoff {
        config.search.date_cutoff = cutoff;
    }
    if let Some(n_trials) = args.n_trials {
        config.search.n_trials = n_trials;
    }
    if args.seed.is_some() {
        config.search.seed = args.seed;
    }

    let history = load_history(&args.history)
        .with_context(|| format!("Failed to load {}", args.history.display()))?;
    println!("Loaded {} historical rows in {:?}", history.len(), start.elapsed());

    let n_trials = config.search.n_trials;
    let mut best_so_far = f64::NEG_INFINITY;
    let mut report = |trial: &TrialRecord| {
        if trial.value > best_so_far {
            best_so_far = trial.value;
            println!("Trial {:>4}/{}: new best {:.4} {:?}", trial.number + 1, n_trials, trial.value, trial.params);
        }
    };

    let outcome = optimize(&history, &config.search, &config.comparison_settings(), Some(&mut report))?;

    println!("\nSearched {} rows since {}", outcome.rows_searched, config.search.date_cutoff);
    println!("Best params: {:?}", outcome.best_params);
    println!("Best value: {:.4}", outcome.best_value);

    println!("\nParameter importances:");
    for p in &outcome.importances {
        println!("  {:<16} {:.3}", p.param, p.importance);
    }

    if let Some(path) = &args.trials_out {
        let mut file = File::create(path).context("Failed to create trials file")?;
        writeln!(file, "number,min_prediction,min_lead_score,max_lead_score,value")?;
        for t in &outcome.study.trials {
            let param = |name: &str| t.params.get(name).map(|v| v.to_string()).unwrap_or_default();
            writeln!(
                file,
                "{},{},{},{},{:.6}",
                t.number,
                param("min_prediction"),
                param("min_lead_score"),
                param("max_lead_score"),
                t.value
            )?;
        }
        println!("\nTrials written to {}", path.display());
    }

    println!("DONE! ({:?})", start.elapsed());
    Ok(())
}
