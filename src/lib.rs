//! Financial viability evaluation for lead-scoring models
//!
//! Simulates the revenue a scoring model would have produced on held-out leads
//! and compares it with two reference routings:
//! - Standard: work every opportunity at a flat cost
//! - CPL: sell every opportunity as a lead
//!
//! The threshold optimizer searches the work threshold and lead score range
//! that maximize net revenue per opportunity.

pub mod error;
pub mod config;
pub mod validation;
pub mod residuals;
pub mod comparison;
pub mod evaluation;
pub mod optimizer;

pub use error::{EvaluationError, Result};
pub use config::{EvaluatorConfig, GateConfig, SearchConfig};
pub use validation::{FeatureFrame, FeatureValue, HistoricalRecord, ModelKind, ValidationSet};
pub use residuals::{AnalysisRow, AnalysisTable, MinPredictionMap};
pub use comparison::{Baseline, ComparisonSettings, FinancialMetrics, LeadScoreRange, SegmentBreakdown};
pub use evaluation::{EvaluationRequest, EvaluationResult, GateDecision, ModelEvaluator, ProductionGate};
pub use optimizer::{optimize, OptimizationOutcome, ThresholdParams};
