//! Per-segment financial metrics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reference routing strategy a model is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Baseline {
    /// Every opportunity worked at a flat cost
    Standard,
    /// Every opportunity sold as a lead
    Cpl,
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Baseline::Standard => write!(f, "standard"),
            Baseline::Cpl => write!(f, "cpl"),
        }
    }
}

/// Output of a revenue strategy for one lead score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutput {
    pub num_opps: usize,
    /// Revenue made by routing on the model (dollars)
    pub bart_made: f64,
    /// Revenue made by the reference strategy (dollars)
    pub baseline_total: f64,
    pub bart_rev_per_opp: f64,
    pub baseline_rev_per_opp: f64,
    /// bart_rev_per_opp - baseline_rev_per_opp
    pub rev_per_opp_improvement: f64,
}

/// Strategy output plus the work split that produced it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub num_opps: usize,
    pub bart_made: f64,
    pub baseline_total: f64,
    pub bart_rev_per_opp: f64,
    pub baseline_rev_per_opp: f64,
    pub rev_per_opp_improvement: f64,
    pub worked: usize,
    pub non_worked: usize,
    /// Share of the segment not worked, 0 for an empty segment
    pub pct_filtered_out: f64,
}

impl FinancialMetrics {
    pub fn from_output(output: StrategyOutput, worked: usize, non_worked: usize) -> Self {
        let total = worked + non_worked;
        let pct_filtered_out = if total > 0 {
            non_worked as f64 / total as f64
        } else {
            0.0
        };
        Self {
            num_opps: output.num_opps,
            bart_made: output.bart_made,
            baseline_total: output.baseline_total,
            bart_rev_per_opp: output.bart_rev_per_opp,
            baseline_rev_per_opp: output.baseline_rev_per_opp,
            rev_per_opp_improvement: output.rev_per_opp_improvement,
            worked,
            non_worked,
            pct_filtered_out,
        }
    }
}

/// Metrics keyed by lead score, ascending
pub type SegmentBreakdown = BTreeMap<i32, FinancialMetrics>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_filtered_out() {
        let m = FinancialMetrics::from_output(StrategyOutput::default(), 3, 1);
        assert_eq!(m.pct_filtered_out, 0.25);

        let empty = FinancialMetrics::from_output(StrategyOutput::default(), 0, 0);
        assert_eq!(empty.pct_filtered_out, 0.0);
    }

    #[test]
    fn test_baseline_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Baseline::Cpl).unwrap(), "\"cpl\"");
        assert_eq!(Baseline::Standard.to_string(), "standard");
    }
}
