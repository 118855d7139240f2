//! Production gate
//!
//! A model ships only when its net improvement against the tougher of the two
//! baselines clears an acceptable margin:
//!   acceptable = MAX(reference rev per opp × ratio, floor)
//! With the defaults that is half the reference, but never less than $10/opp.

use super::evaluator::{EvaluationRequest, EvaluationResult, ModelEvaluator};
use crate::comparison::{Baseline, LeadScoreRange};
use crate::config::GateConfig;
use crate::error::{EvaluationError, Result};
use crate::residuals::{AnalysisTable, TrainedModel};
use crate::validation::{ModelKind, ValidationSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the production check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    /// Baseline the model was held against
    pub checked: Baseline,
    pub net: f64,
    pub reference_rev_per_opp: f64,
    pub acceptable_rev_per_opp: f64,
    pub passed: bool,
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Net vs {}: {:.4}", self.checked, self.net)?;
        writeln!(f, "Reference rev per opp: {:.4}", self.reference_rev_per_opp)?;
        writeln!(f, "Acceptable rev per opp: {:.4}", self.acceptable_rev_per_opp)?;
        write!(f, "Pass check: {}", self.passed)
    }
}

/// Pass/fail rule applied to evaluation results
#[derive(Debug, Clone)]
pub struct ProductionGate {
    config: GateConfig,
}

impl ProductionGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Override the configured reference rev per opp
    pub fn with_reference(mut self, reference_rev_per_opp: f64) -> Self {
        self.config.reference_rev_per_opp = Some(reference_rev_per_opp);
        self
    }

    pub fn reference_rev_per_opp(&self) -> Result<f64> {
        self.config.reference_rev_per_opp.ok_or(EvaluationError::UndefinedReference)
    }

    /// Lead scores the gate evaluates
    pub fn lead_scores(&self) -> Result<LeadScoreRange> {
        LeadScoreRange::spanning(&self.config.lead_scores)
    }

    /// Evaluate `model` on `data` and decide whether it is fit for production
    ///
    /// Fails before evaluating anything when no reference rev per opp is set.
    /// The decision trace is printed whether or not the model passes.
    pub fn ok_for_production(
        &self,
        evaluator: &ModelEvaluator,
        data: &ValidationSet,
        model: Option<&dyn TrainedModel>,
        segment: &str,
        kind: ModelKind,
    ) -> Result<GateDecision> {
        self.reference_rev_per_opp()?;
        let request = EvaluationRequest {
            segment: segment.to_string(),
            min_prediction: None,
            lead_scores: self.lead_scores()?,
            kind,
        };

        let table = evaluator.analysis_table(data, model, &request)?;
        self.check_table(evaluator, &table)
    }

    /// Gate an analysis table that has already been built
    pub fn check_table(&self, evaluator: &ModelEvaluator, table: &AnalysisTable) -> Result<GateDecision> {
        let reference = self.reference_rev_per_opp()?;
        let result = evaluator.evaluate_table(table, None, self.lead_scores()?)?;
        let decision = self.decide(&result, reference);

        println!("{decision}");
        if decision.passed {
            log::info!("Model passed the production gate against {}", decision.checked);
        } else {
            log::warn!("Model failed the production gate against {}", decision.checked);
        }
        Ok(decision)
    }

    /// Apply the rule to an existing evaluation
    pub fn decide(&self, result: &EvaluationResult, reference_rev_per_opp: f64) -> GateDecision {
        let acceptable_rev_per_opp = (reference_rev_per_opp * self.config.acceptable_ratio).max(self.config.acceptable_floor);

        // The lower net means that baseline is the stronger competitor
        let checked = if result.net_vs_cpl < result.net_vs_standard {
            Baseline::Cpl
        } else {
            Baseline::Standard
        };
        let net = result.net(checked);

        GateDecision {
            checked,
            net,
            reference_rev_per_opp,
            acceptable_rev_per_opp,
            passed: net > acceptable_rev_per_opp,
        }
    }
}

impl Default for ProductionGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}
