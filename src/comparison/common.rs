//! Shared per-lead-score aggregation for both baselines

use super::metrics::{FinancialMetrics, SegmentBreakdown};
use super::strategy::{CplStrategy, RevenueStrategy, StandardStrategy, WorkSplit};
use super::{COST_PER_WORKED_OPP, DEFAULT_MIN_PREDICTION};
use crate::error::{EvaluationError, Result};
use crate::residuals::{AnalysisRow, AnalysisTable, MinPredictionMap};
use crate::validation::ModelKind;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Inclusive range of lead scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadScoreRange {
    min: i32,
    max: i32,
}

impl LeadScoreRange {
    /// 8..=15, every lead score the business routes
    pub const ALL_ROUTED: Self = Self { min: 8, max: 15 };

    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min > max {
            return Err(EvaluationError::InvalidSegment { min, max });
        }
        Ok(Self { min, max })
    }

    /// Smallest range covering every score in the list
    pub fn spanning(lead_scores: &[i32]) -> Result<Self> {
        match (lead_scores.iter().min(), lead_scores.iter().max()) {
            (Some(&min), Some(&max)) => Self::new(min, max),
            _ => Err(EvaluationError::InvalidSegment { min: 0, max: -1 }),
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, lead_score: i32) -> bool {
        (self.min..=self.max).contains(&lead_score)
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<i32> {
        self.min..=self.max
    }
}

impl Default for LeadScoreRange {
    fn default() -> Self {
        Self { min: 8, max: 10 }
    }
}

/// Dollar assumptions behind the comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSettings {
    pub cost_per_worked_opp: f64,
    /// Regressor threshold used when no mapping is supplied
    pub default_min_prediction: f64,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            cost_per_worked_opp: COST_PER_WORKED_OPP,
            default_min_prediction: DEFAULT_MIN_PREDICTION,
        }
    }
}

/// Split every lead score in range into worked / non-worked leads and apply
/// `strategy` to each segment.
///
/// Classifier tables split on the predicted label (worked when non-zero);
/// regressor tables work a lead when its prediction reaches the threshold for
/// its lead score. Without a threshold mapping, regressors use
/// `default_min_prediction` for every score. A mapping that lacks a lead score
/// with rows in range is an error; empty lead scores need no threshold.
///
/// # Returns
/// `(total_net, breakdown)` where `total_net` is the ascending-score sum of
/// every segment's `rev_per_opp_improvement`
pub fn calculate_common(
    table: &AnalysisTable,
    min_prediction: Option<&MinPredictionMap>,
    range: LeadScoreRange,
    strategy: &dyn RevenueStrategy,
    default_min_prediction: f64,
) -> Result<(f64, SegmentBreakdown)> {
    let thresholds: Option<Cow<'_, MinPredictionMap>> = match (table.kind, min_prediction) {
        (ModelKind::Classifier, _) => None,
        (ModelKind::Regressor, Some(map)) => Some(Cow::Borrowed(map)),
        (ModelKind::Regressor, None) => Some(Cow::Owned(
            range.iter().map(|ls| (ls, default_min_prediction)).collect(),
        )),
    };

    let mut total_net = 0.0;
    let mut breakdown = SegmentBreakdown::new();

    for lead_score in range.iter() {
        let filtered = table.segment_rows(lead_score);

        let (worked, non_worked): (Vec<&AnalysisRow>, Vec<&AnalysisRow>) = match &thresholds {
            // Nothing to route, so no threshold is needed
            _ if filtered.is_empty() => (Vec::new(), Vec::new()),
            None => filtered.iter().copied().partition(|r| r.predicted != 0.0),
            Some(map) => {
                let threshold = *map
                    .get(&lead_score)
                    .ok_or(EvaluationError::MissingPredictionThreshold { lead_score })?;
                filtered.iter().copied().partition(|r| r.predicted >= threshold)
            }
        };

        let split = WorkSplit {
            lead_score,
            worked,
            non_worked,
            filtered,
        };
        let output = strategy.compute(&split);
        let metrics = FinancialMetrics::from_output(output, split.worked.len(), split.non_worked.len());

        log::debug!(
            "{} lead score {}: {} opps, {} worked, improvement {:.2}/opp",
            strategy.baseline(),
            lead_score,
            metrics.num_opps,
            metrics.worked,
            metrics.rev_per_opp_improvement
        );

        total_net += metrics.rev_per_opp_improvement;
        breakdown.insert(lead_score, metrics);
    }

    Ok((total_net, breakdown))
}

/// Compare model routing with working every opportunity
pub fn calculate_standard(
    table: &AnalysisTable,
    min_prediction: Option<&MinPredictionMap>,
    range: LeadScoreRange,
    settings: &ComparisonSettings,
) -> Result<(f64, SegmentBreakdown)> {
    let strategy = StandardStrategy {
        cost_per_worked_opp: settings.cost_per_worked_opp,
    };
    calculate_common(table, min_prediction, range, &strategy, settings.default_min_prediction)
}

/// Compare model routing with selling every opportunity as a lead
pub fn calculate_cpl(
    table: &AnalysisTable,
    min_prediction: Option<&MinPredictionMap>,
    range: LeadScoreRange,
    settings: &ComparisonSettings,
) -> Result<(f64, SegmentBreakdown)> {
    let strategy = CplStrategy {
        cost_per_worked_opp: settings.cost_per_worked_opp,
    };
    calculate_common(table, min_prediction, range, &strategy, settings.default_min_prediction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(lead_score: i32, actual: f64, predicted: f64, cpl_revenue: f64) -> AnalysisRow {
        AnalysisRow {
            lead_score,
            actual,
            predicted,
            cpl_revenue,
            residual: (predicted - actual).abs(),
            min_prediction: None,
        }
    }

    fn regressor_table() -> AnalysisTable {
        AnalysisTable::new(
            "standard",
            ModelKind::Regressor,
            vec![
                row(8, 0.0, 120.0, 35.0),
                row(8, 400.0, 650.0, 0.0),
                row(9, 250.0, 300.0, 20.0),
                row(9, 0.0, 299.9, 60.0),
                row(9, 0.0, 10.0, 0.0),
                row(10, 200.0, 500.0, 0.0),
                row(10, 300.0, 420.0, 0.0),
                row(10, 0.0, 90.0, 50.0),
                row(11, 900.0, 1000.0, 0.0),
            ],
        )
    }

    #[test]
    fn test_counts_partition_each_segment() {
        let table = regressor_table();
        let range = LeadScoreRange::new(8, 10).unwrap();
        let (_, breakdown) = calculate_standard(&table, None, range, &ComparisonSettings::default()).unwrap();

        assert_eq!(breakdown.keys().copied().collect::<Vec<_>>(), vec![8, 9, 10]);
        for (lead_score, m) in &breakdown {
            assert_eq!(m.worked + m.non_worked, table.segment_rows(*lead_score).len());
            assert_eq!(m.num_opps, table.segment_rows(*lead_score).len());
            assert!((0.0..=1.0).contains(&m.pct_filtered_out));
        }

        // Threshold is inclusive: 300.0 is worked, 299.9 is not
        assert_eq!(breakdown[&9].worked, 1);
        assert_eq!(breakdown[&9].non_worked, 2);
    }

    #[test]
    fn test_total_net_is_exact_sum() {
        let table = regressor_table();
        let range = LeadScoreRange::new(8, 11).unwrap();
        for (total, breakdown) in [
            calculate_standard(&table, None, range, &ComparisonSettings::default()).unwrap(),
            calculate_cpl(&table, None, range, &ComparisonSettings::default()).unwrap(),
        ] {
            let mut expected = 0.0;
            for m in breakdown.values() {
                expected += m.rev_per_opp_improvement;
            }
            assert_eq!(total, expected);
        }
    }

    #[test]
    fn test_lead_score_ten_scenario() {
        let table = regressor_table();
        let range = LeadScoreRange::new(10, 10).unwrap();
        let (net, breakdown) = calculate_standard(&table, None, range, &ComparisonSettings::default()).unwrap();
        let m = &breakdown[&10];

        assert_eq!(m.worked, 2);
        assert_eq!(m.non_worked, 1);
        assert!((m.baseline_rev_per_opp - 170.0 / 3.0).abs() < 1e-9);
        assert!((m.bart_made - 330.0).abs() < 1e-9);
        assert!((m.bart_rev_per_opp - 110.0).abs() < 1e-9);
        assert!((net - (110.0 - 170.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_segment_in_range() {
        let table = regressor_table();
        let range = LeadScoreRange::new(12, 14).unwrap();
        let (net, breakdown) = calculate_cpl(&table, None, range, &ComparisonSettings::default()).unwrap();

        assert_eq!(net, 0.0);
        assert_eq!(breakdown.len(), 3);
        for m in breakdown.values() {
            assert_eq!(m.worked, 0);
            assert_eq!(m.non_worked, 0);
            assert_eq!(m.pct_filtered_out, 0.0);
        }
    }

    #[test]
    fn test_explicit_mapping_must_cover_range() {
        let table = regressor_table();
        let range = LeadScoreRange::new(8, 10).unwrap();
        let mut map = MinPredictionMap::new();
        map.insert(8, 100.0);
        map.insert(9, 100.0);

        let err = calculate_standard(&table, Some(&map), range, &ComparisonSettings::default()).unwrap_err();
        assert!(matches!(err, EvaluationError::MissingPredictionThreshold { lead_score: 10 }));

        map.insert(10, 100.0);
        let (_, breakdown) = calculate_standard(&table, Some(&map), range, &ComparisonSettings::default()).unwrap();
        assert_eq!(breakdown[&9].worked, 2);
    }

    #[test]
    fn test_mapping_not_needed_for_empty_lead_score() {
        let table = regressor_table();
        let range = LeadScoreRange::new(10, 12).unwrap();
        let mut map = MinPredictionMap::new();
        map.insert(10, 300.0);
        map.insert(11, 300.0);

        let (net, breakdown) = calculate_standard(&table, Some(&map), range, &ComparisonSettings::default()).unwrap();
        let empty = &breakdown[&12];
        assert_eq!((empty.worked, empty.non_worked), (0, 0));
        assert_eq!(empty.rev_per_opp_improvement, 0.0);
        assert_eq!(net, breakdown[&10].rev_per_opp_improvement + breakdown[&11].rev_per_opp_improvement);
    }

    #[test]
    fn test_classifier_splits_on_label() {
        let table = AnalysisTable::new(
            "standard",
            ModelKind::Classifier,
            vec![row(10, 500.0, 1.0, 0.0), row(10, 0.0, 0.0, 40.0), row(10, 0.0, 0.0, 30.0)],
        );
        let range = LeadScoreRange::new(10, 10).unwrap();
        // Mapping is ignored for classifiers
        let (_, breakdown) =
            calculate_cpl(&table, Some(&MinPredictionMap::new()), range, &ComparisonSettings::default()).unwrap();

        assert_eq!(breakdown[&10].worked, 1);
        assert_eq!(breakdown[&10].non_worked, 2);
        assert!((breakdown[&10].pct_filtered_out - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_range_validation() {
        assert!(matches!(
            LeadScoreRange::new(11, 10),
            Err(EvaluationError::InvalidSegment { min: 11, max: 10 })
        ));
        let range = LeadScoreRange::spanning(&[12, 10, 11]).unwrap();
        assert_eq!((range.min(), range.max()), (10, 12));
        assert!(range.contains(11));
        assert!(LeadScoreRange::spanning(&[]).is_err());
    }
}
