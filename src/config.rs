//! Evaluator configuration
//!
//! All values can be supplied through a JSON file; any field left out falls
//! back to the production defaults below.

use crate::comparison::{ComparisonSettings, COST_PER_WORKED_OPP, DEFAULT_MIN_PREDICTION};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Cost charged for every worked opportunity (dollars)
    #[serde(default = "default_cost")]
    pub cost_per_worked_opp: f64,

    /// Regressor threshold used for every lead score when no mapping is given
    #[serde(default = "default_min_prediction")]
    pub default_min_prediction: f64,

    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Production gate parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Lead scores the gate evaluates (as the inclusive min..=max of the list)
    #[serde(default = "default_gate_lead_scores")]
    pub lead_scores: Vec<i32>,

    /// Share of the reference rev per opp the model must beat (0.5 = 50%)
    #[serde(default = "default_acceptable_ratio")]
    pub acceptable_ratio: f64,

    /// Absolute minimum improvement per opp (dollars)
    #[serde(default = "default_acceptable_floor")]
    pub acceptable_floor: f64,

    /// Reference rev per opp; the gate refuses to run without one
    #[serde(default)]
    pub reference_rev_per_opp: Option<f64>,
}

/// Threshold search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_n_trials")]
    pub n_trials: usize,

    /// Only history created on or after this date (YYYY-MM-DD) is searched
    #[serde(default = "default_date_cutoff")]
    pub date_cutoff: String,

    /// Seed for reproducible searches; unseeded runs draw from entropy
    #[serde(default)]
    pub seed: Option<u64>,

    /// Purely random trials before the search starts exploiting the best ones
    #[serde(default = "default_n_startup_trials")]
    pub n_startup_trials: usize,

    #[serde(default = "default_min_prediction_bounds")]
    pub min_prediction_bounds: (i64, i64),

    #[serde(default = "default_min_lead_score_bounds")]
    pub min_lead_score_bounds: (i64, i64),

    /// Upper limit for max_lead_score; its lower limit is the sampled min_lead_score
    #[serde(default = "default_max_lead_score_cap")]
    pub max_lead_score_cap: i64,
}

fn default_cost() -> f64 { COST_PER_WORKED_OPP }
fn default_min_prediction() -> f64 { DEFAULT_MIN_PREDICTION }
fn default_gate_lead_scores() -> Vec<i32> { vec![10, 11, 12] }
fn default_acceptable_ratio() -> f64 { 0.5 }
fn default_acceptable_floor() -> f64 { 10.0 }
fn default_n_trials() -> usize { 500 }
fn default_date_cutoff() -> String { "2023-08-01".to_string() }
fn default_n_startup_trials() -> usize { 20 }
fn default_min_prediction_bounds() -> (i64, i64) { (100, 800) }
fn default_min_lead_score_bounds() -> (i64, i64) { (5, 8) }
fn default_max_lead_score_cap() -> i64 { 10 }

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            cost_per_worked_opp: COST_PER_WORKED_OPP,
            default_min_prediction: DEFAULT_MIN_PREDICTION,
            gate: GateConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            lead_scores: default_gate_lead_scores(),
            acceptable_ratio: 0.5,
            acceptable_floor: 10.0,
            reference_rev_per_opp: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            n_trials: 500,
            date_cutoff: default_date_cutoff(),
            seed: None,
            n_startup_trials: 20,
            min_prediction_bounds: (100, 800),
            min_lead_score_bounds: (5, 8),
            max_lead_score_cap: 10,
        }
    }
}

impl EvaluatorConfig {
    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Comparison settings derived from this configuration
    pub fn comparison_settings(&self) -> ComparisonSettings {
        ComparisonSettings {
            cost_per_worked_opp: self.cost_per_worked_opp,
            default_min_prediction: self.default_min_prediction,
        }
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                log::info!("Loading evaluator config from {}", path.display());
                Self::from_json_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}
