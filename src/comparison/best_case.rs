//! Perfect-prediction upper bound
//!
//! A perfect model works exactly the leads that convert and sells the rest.
//! Comparing it to the CPL-only baseline shows how much headroom any model has
//! at each lead score.

use super::common::LeadScoreRange;
use crate::residuals::AnalysisTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Best-case revenue at one lead score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BestCaseMetrics {
    pub num_opps: usize,
    /// (perfect_sales_rev + perfect_cpl_rev) / num_opps
    pub perfect_rev_per_opp: f64,
    /// CPL-only revenue per opp
    pub baseline_rev_per_opp: f64,
    /// Actual revenue of every lead that converted
    pub perfect_sales_rev: f64,
    /// CPL revenue of every lead that did not convert
    pub perfect_cpl_rev: f64,
}

/// Lead scores the best case is reported for
pub fn best_case_range() -> LeadScoreRange {
    LeadScoreRange::ALL_ROUTED
}

/// Compute the perfect-prediction bound for every lead score in range
///
/// Empty lead scores report zeros.
pub fn calculate_best_case(table: &AnalysisTable, range: LeadScoreRange) -> BTreeMap<i32, BestCaseMetrics> {
    let mut values = BTreeMap::new();

    for lead_score in range.iter() {
        let rows = table.segment_rows(lead_score);
        let num_opps = rows.len();

        let perfect_sales_rev: f64 = rows.iter().filter(|r| r.actual > 0.0).map(|r| r.actual).sum();
        let perfect_cpl_rev: f64 = rows.iter().filter(|r| r.actual == 0.0).map(|r| r.cpl_revenue).sum();
        let base_cpl_rev: f64 = rows.iter().map(|r| r.cpl_revenue).sum();

        let (perfect_rev_per_opp, baseline_rev_per_opp) = if num_opps > 0 {
            let n = num_opps as f64;
            ((perfect_sales_rev + perfect_cpl_rev) / n, base_cpl_rev / n)
        } else {
            (0.0, 0.0)
        };

        values.insert(
            lead_score,
            BestCaseMetrics {
                num_opps,
                perfect_rev_per_opp,
                baseline_rev_per_opp,
                perfect_sales_rev,
                perfect_cpl_rev,
            },
        );
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residuals::AnalysisRow;
    use crate::validation::ModelKind;

    fn row(lead_score: i32, actual: f64, cpl_revenue: f64) -> AnalysisRow {
        AnalysisRow {
            lead_score,
            actual,
            predicted: 0.0,
            cpl_revenue,
            residual: 0.0,
            min_prediction: None,
        }
    }

    #[test]
    fn test_best_case_per_lead_score() {
        let table = AnalysisTable::new(
            "standard",
            ModelKind::Regressor,
            vec![row(9, 600.0, 40.0), row(9, 0.0, 40.0), row(9, 0.0, 20.0), row(15, 0.0, 10.0)],
        );

        let values = calculate_best_case(&table, best_case_range());
        assert_eq!(values.len(), 8);

        let nine = values[&9];
        assert_eq!(nine.num_opps, 3);
        assert_eq!(nine.perfect_sales_rev, 600.0);
        assert_eq!(nine.perfect_cpl_rev, 60.0);
        assert!((nine.perfect_rev_per_opp - 220.0).abs() < 1e-9);
        assert!((nine.baseline_rev_per_opp - 100.0 / 3.0).abs() < 1e-9);

        assert_eq!(values[&12], BestCaseMetrics::default());
        assert_eq!(values[&15].perfect_rev_per_opp, 10.0);
    }
}
