//! Revenue strategies compared against model routing
//!
//! Both strategies value model routing the same way: non-worked leads are
//! sold for their CPL revenue, worked leads earn their actual revenue less the
//! cost of working them. They differ only in the reference they are measured
//! against.

use super::metrics::{Baseline, StrategyOutput};
use crate::residuals::AnalysisRow;

/// Rows of one lead score split by the routing decision
#[derive(Debug, Clone)]
pub struct WorkSplit<'a> {
    pub lead_score: i32,
    pub worked: Vec<&'a AnalysisRow>,
    pub non_worked: Vec<&'a AnalysisRow>,
    /// The whole segment, in table order
    pub filtered: Vec<&'a AnalysisRow>,
}

impl WorkSplit<'_> {
    pub fn num_opps(&self) -> usize {
        self.filtered.len()
    }
}

/// Per-lead-score revenue computation
pub trait RevenueStrategy {
    fn baseline(&self) -> Baseline;

    fn compute(&self, split: &WorkSplit<'_>) -> StrategyOutput;
}

/// Reference: work every opportunity
#[derive(Debug, Clone, Copy)]
pub struct StandardStrategy {
    pub cost_per_worked_opp: f64,
}

/// Reference: sell every opportunity as a lead
#[derive(Debug, Clone, Copy)]
pub struct CplStrategy {
    pub cost_per_worked_opp: f64,
}

impl RevenueStrategy for StandardStrategy {
    fn baseline(&self) -> Baseline {
        Baseline::Standard
    }

    fn compute(&self, split: &WorkSplit<'_>) -> StrategyOutput {
        // Baseline = Σ actual - cost × n
        let baseline = sum_actual(&split.filtered) - self.cost_per_worked_opp * split.num_opps() as f64;
        let bart_made = bart_made(split, self.cost_per_worked_opp);
        per_opp_output(split.num_opps(), bart_made, baseline)
    }
}

impl RevenueStrategy for CplStrategy {
    fn baseline(&self) -> Baseline {
        Baseline::Cpl
    }

    fn compute(&self, split: &WorkSplit<'_>) -> StrategyOutput {
        let baseline = sum_cpl(&split.filtered);
        let bart_made = bart_made(split, self.cost_per_worked_opp);
        per_opp_output(split.num_opps(), bart_made, baseline)
    }
}

/// Σ CPL(non-worked) + Σ actual(worked) - cost × worked
pub fn bart_made(split: &WorkSplit<'_>, cost_per_worked_opp: f64) -> f64 {
    let cpl_upside = sum_cpl(&split.non_worked);
    let rev_opp_worked = sum_actual(&split.worked) - cost_per_worked_opp * split.worked.len() as f64;
    cpl_upside + rev_opp_worked
}

fn per_opp_output(num_opps: usize, bart_made: f64, baseline_total: f64) -> StrategyOutput {
    // Empty segments contribute nothing
    let (bart_rev_per_opp, baseline_rev_per_opp) = if num_opps > 0 {
        (bart_made / num_opps as f64, baseline_total / num_opps as f64)
    } else {
        (0.0, 0.0)
    };
    StrategyOutput {
        num_opps,
        bart_made,
        baseline_total,
        bart_rev_per_opp,
        baseline_rev_per_opp,
        rev_per_opp_improvement: bart_rev_per_opp - baseline_rev_per_opp,
    }
}

fn sum_actual(rows: &[&AnalysisRow]) -> f64 {
    rows.iter().map(|r| r.actual).sum()
}

fn sum_cpl(rows: &[&AnalysisRow]) -> f64 {
    rows.iter().map(|r| r.cpl_revenue).sum()
}
