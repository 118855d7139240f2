//! Evaluate a model against both baselines

use crate::comparison::{calculate_cpl, calculate_standard, Baseline, ComparisonSettings, LeadScoreRange, SegmentBreakdown};
use crate::error::Result;
use crate::residuals::{
    calculate_residuals, AnalysisTable, Collaborators, MinPredictionMap, ModelRouter, RevenueSource, TrainedModel,
};
use crate::validation::{ModelKind, ValidationSet};
use serde::{Deserialize, Serialize};

/// Per-lead-score breakdown against each baseline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadScoreAnalysis {
    pub standard: SegmentBreakdown,
    pub cpl: SegmentBreakdown,
}

impl LeadScoreAnalysis {
    pub fn get(&self, baseline: Baseline) -> &SegmentBreakdown {
        match baseline {
            Baseline::Standard => &self.standard,
            Baseline::Cpl => &self.cpl,
        }
    }
}

/// Net improvement per opp summed over the evaluated lead scores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub net_vs_standard: f64,
    pub net_vs_cpl: f64,
    pub lead_scores: LeadScoreAnalysis,
}

impl EvaluationResult {
    pub fn net(&self, baseline: Baseline) -> f64 {
        match baseline {
            Baseline::Standard => self.net_vs_standard,
            Baseline::Cpl => self.net_vs_cpl,
        }
    }
}

/// What to evaluate
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub segment: String,
    /// Regressor thresholds; replaced by router thresholds when the router provides them
    pub min_prediction: Option<MinPredictionMap>,
    pub lead_scores: LeadScoreRange,
    pub kind: ModelKind,
}

impl Default for EvaluationRequest {
    fn default() -> Self {
        Self {
            segment: "standard".to_string(),
            min_prediction: None,
            lead_scores: LeadScoreRange::default(),
            kind: ModelKind::Regressor,
        }
    }
}

/// Runs the residual calculation and both baseline comparisons
pub struct ModelEvaluator {
    router: Box<dyn ModelRouter>,
    revenue: Option<Box<dyn RevenueSource>>,
    settings: ComparisonSettings,
}

impl ModelEvaluator {
    pub fn new(router: Box<dyn ModelRouter>) -> Self {
        Self {
            router,
            revenue: None,
            settings: ComparisonSettings::default(),
        }
    }

    /// Revenue source used to score classifiers
    pub fn with_revenue_source(mut self, revenue: Box<dyn RevenueSource>) -> Self {
        self.revenue = Some(revenue);
        self
    }

    pub fn with_settings(mut self, settings: ComparisonSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the analysis table for a validation set
    pub fn analysis_table(
        &self,
        data: &ValidationSet,
        model: Option<&dyn TrainedModel>,
        request: &EvaluationRequest,
    ) -> Result<AnalysisTable> {
        let collaborators = Collaborators {
            router: self.router.as_ref(),
            revenue: self.revenue.as_deref(),
        };
        calculate_residuals(data, &request.segment, model, collaborators, request.kind)
    }

    /// Evaluate `model` (or the routed production models) on `data`
    pub fn evaluate(
        &self,
        data: &ValidationSet,
        model: Option<&dyn TrainedModel>,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult> {
        let table = self.analysis_table(data, model, request)?;
        self.evaluate_table(&table, request.min_prediction.as_ref(), request.lead_scores)
    }

    /// Compare an already built analysis table against both baselines
    pub fn evaluate_table(
        &self,
        table: &AnalysisTable,
        min_prediction: Option<&MinPredictionMap>,
        lead_scores: LeadScoreRange,
    ) -> Result<EvaluationResult> {
        log::info!(
            "Evaluating {} {} rows for segment '{}' over lead scores {}..={}",
            table.len(),
            table.kind,
            table.segment,
            lead_scores.min(),
            lead_scores.max()
        );

        // Router thresholds take precedence over the caller's mapping
        let routed;
        let min_prediction = if table.has_min_prediction() {
            routed = table.min_prediction_by_lead_score();
            Some(&routed)
        } else {
            min_prediction
        };

        compare_baselines(table, min_prediction, lead_scores, &self.settings)
    }
}

/// Run both comparators over an existing analysis table
pub fn compare_baselines(
    table: &AnalysisTable,
    min_prediction: Option<&MinPredictionMap>,
    range: LeadScoreRange,
    settings: &ComparisonSettings,
) -> Result<EvaluationResult> {
    let (net_vs_standard, standard) = calculate_standard(table, min_prediction, range, settings)?;
    let (net_vs_cpl, cpl) = calculate_cpl(table, min_prediction, range, settings)?;

    log::info!("Net vs standard: {:.2}, net vs CPL: {:.2}", net_vs_standard, net_vs_cpl);

    Ok(EvaluationResult {
        net_vs_standard,
        net_vs_cpl,
        lead_scores: LeadScoreAnalysis { standard, cpl },
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::residuals::RoutedPredictions;
    use crate::validation::{FeatureFrame, FeatureValue};

    /// Router returning fixed predictions
    pub(crate) struct FixedRouter(pub RoutedPredictions);

    impl ModelRouter for FixedRouter {
        fn predict(&self, _features: &FeatureFrame, _decorated: bool) -> Result<RoutedPredictions> {
            Ok(self.0.clone())
        }
    }

    /// (lead score, actual, cpl revenue) rows
    pub(crate) fn validation_set(rows: &[(i32, f64, Option<f64>)]) -> ValidationSet {
        ValidationSet::new(
            FeatureFrame::new(
                vec!["LEAD_SCORE".to_string()],
                rows.iter().map(|r| vec![FeatureValue::Number(r.0 as f64)]).collect(),
            ),
            rows.iter().map(|r| r.1).collect(),
            rows.iter().map(|r| r.2).collect(),
        )
    }

    fn sample() -> (ValidationSet, Vec<f64>) {
        let data = validation_set(&[
            (10, 200.0, None),
            (10, 300.0, Some(0.0)),
            (10, 0.0, Some(50.0)),
            (11, 0.0, Some(80.0)),
            (11, 700.0, Some(10.0)),
            (12, 0.0, Some(60.0)),
        ]);
        let predictions = vec![450.0, 380.0, 120.0, 350.0, 900.0, -5.0];
        (data, predictions)
    }

    #[test]
    fn test_evaluate_both_baselines() {
        let (data, prediction) = sample();
        let evaluator = ModelEvaluator::new(Box::new(FixedRouter(RoutedPredictions {
            prediction,
            min_prediction: None,
        })));
        let request = EvaluationRequest {
            lead_scores: LeadScoreRange::new(10, 12).unwrap(),
            ..Default::default()
        };

        let result = evaluator.evaluate(&data, None, &request).unwrap();

        let sum_std: f64 = result.lead_scores.standard.values().map(|m| m.rev_per_opp_improvement).sum();
        assert!((result.net_vs_standard - sum_std).abs() < 1e-9);
        for ls in 10..=12 {
            let s = &result.lead_scores.standard[&ls];
            let c = &result.lead_scores.cpl[&ls];
            assert_eq!(s.bart_made, c.bart_made);
            assert_eq!(s.bart_rev_per_opp, c.bart_rev_per_opp);
        }
        // Lead score 10: standard baseline (500 - 330) / 3, model (50 + 500 - 220) / 3
        let ten = &result.lead_scores.standard[&10];
        assert!((ten.rev_per_opp_improvement - (330.0 - 170.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let (data, prediction) = sample();
        let evaluator = ModelEvaluator::new(Box::new(FixedRouter(RoutedPredictions {
            prediction,
            min_prediction: None,
        })));
        let request = EvaluationRequest::default();

        let first = evaluator.evaluate(&data, None, &request).unwrap();
        let second = evaluator.evaluate(&data, None, &request).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_router_thresholds_override_request() {
        let (data, prediction) = sample();
        let router = FixedRouter(RoutedPredictions {
            prediction,
            min_prediction: Some(vec![Some(400.0); 6]),
        });
        let evaluator = ModelEvaluator::new(Box::new(router));

        // A mapping missing lead score 11 would fail if it were used
        let mut mapping = MinPredictionMap::new();
        mapping.insert(10, 0.0);
        let request = EvaluationRequest {
            min_prediction: Some(mapping),
            lead_scores: LeadScoreRange::new(10, 11).unwrap(),
            ..Default::default()
        };

        let result = evaluator.evaluate(&data, None, &request).unwrap();
        assert_eq!(result.lead_scores.standard[&10].worked, 1);
        assert_eq!(result.lead_scores.standard[&11].worked, 1);
    }

    #[test]
    fn test_router_thresholds_with_empty_lead_score() {
        let data = validation_set(&[(10, 500.0, Some(0.0)), (12, 0.0, Some(40.0))]);
        let router = FixedRouter(RoutedPredictions {
            prediction: vec![450.0, 100.0],
            min_prediction: Some(vec![Some(300.0), Some(300.0)]),
        });
        let evaluator = ModelEvaluator::new(Box::new(router));
        let request = EvaluationRequest {
            lead_scores: LeadScoreRange::new(10, 12).unwrap(),
            ..Default::default()
        };

        let result = evaluator.evaluate(&data, None, &request).unwrap();
        for breakdown in [&result.lead_scores.standard, &result.lead_scores.cpl] {
            let eleven = &breakdown[&11];
            assert_eq!((eleven.worked, eleven.non_worked), (0, 0));
            assert_eq!(eleven.pct_filtered_out, 0.0);
            assert_eq!(eleven.rev_per_opp_improvement, 0.0);
        }
        assert_eq!(result.lead_scores.standard[&10].worked, 1);
        assert_eq!(result.lead_scores.standard[&12].non_worked, 1);
    }

    #[test]
    fn test_evaluate_table_matches_evaluate() {
        let (data, prediction) = sample();
        let evaluator = ModelEvaluator::new(Box::new(FixedRouter(RoutedPredictions {
            prediction,
            min_prediction: None,
        })));
        let request = EvaluationRequest {
            lead_scores: LeadScoreRange::new(10, 12).unwrap(),
            ..Default::default()
        };

        let table = evaluator.analysis_table(&data, None, &request).unwrap();
        let from_table = evaluator.evaluate_table(&table, None, request.lead_scores).unwrap();
        assert_eq!(from_table, evaluator.evaluate(&data, None, &request).unwrap());
    }
}
