//! Baseline comparison: model routing vs standard and CPL routing

mod metrics;
mod strategy;
mod common;
pub mod best_case;

pub use metrics::{Baseline, FinancialMetrics, SegmentBreakdown, StrategyOutput};
pub use strategy::{bart_made, CplStrategy, RevenueStrategy, StandardStrategy, WorkSplit};
pub use common::{calculate_common, calculate_cpl, calculate_standard, ComparisonSettings, LeadScoreRange};
pub use best_case::{best_case_range, calculate_best_case, BestCaseMetrics};

// ============================================================================
// Routing Economics
// ============================================================================

/// Cost of working one opportunity (dollars)
pub const COST_PER_WORKED_OPP: f64 = 110.0;

/// Regressor work threshold when no per-lead-score mapping is available
pub const DEFAULT_MIN_PREDICTION: f64 = 300.0;
