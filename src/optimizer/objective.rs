//! Financial-viability objective and the threshold search driver

use super::diagnostics::{pairwise_contours, param_importances, ContourGrid, ParamImportance};
use super::search::{Progress, SearchEngine, SequentialSearch, Study, Trial};
use crate::comparison::{ComparisonSettings, LeadScoreRange};
use crate::config::SearchConfig;
use crate::error::{EvaluationError, Result};
use crate::evaluation::{compare_baselines, metric};
use crate::residuals::{AnalysisTable, MinPredictionMap};
use crate::validation::{filter_since, parse_date_cutoff, HistoricalRecord};
use serde::{Deserialize, Serialize};

pub const MIN_PREDICTION: &str = "min_prediction";
pub const MIN_LEAD_SCORE: &str = "min_lead_score";
pub const MAX_LEAD_SCORE: &str = "max_lead_score";

/// Bounds of the three searched parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub min_prediction: (i64, i64),
    pub min_lead_score: (i64, i64),
    /// max_lead_score is searched over min_lead_score..=cap
    pub max_lead_score_cap: i64,
}

impl SearchSpace {
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let (low, high) = config.min_prediction_bounds;
        if low > high {
            return Err(EvaluationError::InvalidSearchBounds {
                param: MIN_PREDICTION.to_string(),
                low,
                high,
            });
        }
        let (ls_low, ls_high) = config.min_lead_score_bounds;
        if ls_low > ls_high || ls_high > config.max_lead_score_cap {
            return Err(EvaluationError::InvalidSegment {
                min: ls_low as i32,
                max: config.max_lead_score_cap.min(ls_high) as i32,
            });
        }
        Ok(Self {
            min_prediction: config.min_prediction_bounds,
            min_lead_score: config.min_lead_score_bounds,
            max_lead_score_cap: config.max_lead_score_cap,
        })
    }
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            min_prediction: (100, 800),
            min_lead_score: (5, 8),
            max_lead_score_cap: 10,
        }
    }
}

/// One point of the search space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdParams {
    pub min_prediction: i64,
    pub min_lead_score: i64,
    pub max_lead_score: i64,
}

/// Net improvement per opp against the harder baseline, summed over the range,
/// when every lead score in range uses the same regressor threshold
pub fn calculate_financial_viability(
    table: &AnalysisTable,
    min_prediction: f64,
    range: LeadScoreRange,
    settings: &ComparisonSettings,
) -> Result<f64> {
    let thresholds: MinPredictionMap = range.iter().map(|ls| (ls, min_prediction)).collect();
    let result = compare_baselines(table, Some(&thresholds), range, settings)?;

    let mut total = 0.0;
    for lead_score in range.iter() {
        total += metric(&result.lead_scores, lead_score)?;
    }
    Ok(total)
}

/// Objective for one trial over an already filtered history
pub fn objective(
    table: &AnalysisTable,
    space: &SearchSpace,
    settings: &ComparisonSettings,
    trial: &mut dyn Trial,
) -> Result<f64> {
    let min_prediction = trial.suggest_int(MIN_PREDICTION, space.min_prediction.0, space.min_prediction.1);
    let min_lead_score = trial.suggest_int(MIN_LEAD_SCORE, space.min_lead_score.0, space.min_lead_score.1);
    let max_lead_score = trial.suggest_int(MAX_LEAD_SCORE, min_lead_score, space.max_lead_score_cap);

    let range = LeadScoreRange::new(min_lead_score as i32, max_lead_score as i32)?;
    calculate_financial_viability(table, min_prediction as f64, range, settings)
}

/// Result of a threshold search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub best_params: ThresholdParams,
    pub best_value: f64,
    /// Rows that survived the date cutoff
    pub rows_searched: usize,
    pub study: Study,
    pub importances: Vec<ParamImportance>,
    pub contours: Vec<ContourGrid>,
}

/// Search thresholds over history created on or after `config.date_cutoff`
/// with the built-in sequential sampler
pub fn optimize(
    history: &[HistoricalRecord],
    config: &SearchConfig,
    settings: &ComparisonSettings,
    progress: Option<&mut Progress<'_>>,
) -> Result<OptimizationOutcome> {
    let mut engine = SequentialSearch::new(config.seed, config.n_startup_trials);
    optimize_with(&mut engine, history, config, settings, progress)
}

/// Same as [`optimize`] with a caller-supplied search engine
pub fn optimize_with(
    engine: &mut dyn SearchEngine,
    history: &[HistoricalRecord],
    config: &SearchConfig,
    settings: &ComparisonSettings,
    progress: Option<&mut Progress<'_>>,
) -> Result<OptimizationOutcome> {
    let cutoff = parse_date_cutoff(&config.date_cutoff)?;
    let space = SearchSpace::from_config(config)?;

    let filtered = filter_since(history, cutoff);
    if filtered.is_empty() {
        log::warn!("No history on or after {}; every trial will score 0", cutoff);
    }
    let table = AnalysisTable::from_history("history", &filtered)?;
    log::info!(
        "Searching thresholds over {} of {} rows ({} trials)",
        table.len(),
        history.len(),
        config.n_trials
    );

    let mut run = |trial: &mut dyn Trial| objective(&table, &space, settings, trial);
    let study = engine.optimize(&mut run, config.n_trials, progress)?;

    let best = study.best_trial().ok_or(EvaluationError::NoCompletedTrials)?;
    let param = |name: &str| best.params.get(name).copied().unwrap_or_default();
    let best_params = ThresholdParams {
        min_prediction: param(MIN_PREDICTION),
        min_lead_score: param(MIN_LEAD_SCORE),
        max_lead_score: param(MAX_LEAD_SCORE),
    };
    let best_value = best.value;

    let importances = param_importances(&study);
    let contours = pairwise_contours(&study, &[MIN_PREDICTION, MIN_LEAD_SCORE, MAX_LEAD_SCORE]);

    Ok(OptimizationOutcome {
        best_params,
        best_value,
        rows_searched: table.len(),
        study,
        importances,
        contours,
    })
}
