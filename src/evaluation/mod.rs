//! Model evaluation against the standard and CPL baselines

mod evaluator;
mod selector;
mod gate;

pub use evaluator::{compare_baselines, EvaluationRequest, EvaluationResult, LeadScoreAnalysis, ModelEvaluator};
pub use selector::{harder_baseline, metric};
pub use gate::{GateDecision, ProductionGate};
