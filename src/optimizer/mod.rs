//! Threshold search over minimum prediction and lead score range

pub mod search;
pub mod diagnostics;
mod objective;

pub use search::{Objective, Progress, SearchEngine, SequentialSearch, Study, Trial, TrialRecord};
pub use diagnostics::{contour, pairwise_contours, param_importances, ContourGrid, ParamImportance};
pub use objective::{
    calculate_financial_viability, objective, optimize, optimize_with, OptimizationOutcome, SearchSpace,
    ThresholdParams, MAX_LEAD_SCORE, MIN_LEAD_SCORE, MIN_PREDICTION,
};
