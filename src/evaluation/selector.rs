//! Pick the baseline that is harder to beat

use super::evaluator::LeadScoreAnalysis;
use crate::comparison::{Baseline, FinancialMetrics};
use crate::error::{EvaluationError, Result};

/// Baseline with the higher baseline rev per opp at `lead_score`
///
/// CPL only wins when strictly higher; equal baselines resolve to Standard.
pub fn harder_baseline(analysis: &LeadScoreAnalysis, lead_score: i32) -> Result<Baseline> {
    let standard = lookup(analysis, Baseline::Standard, lead_score)?;
    let cpl = lookup(analysis, Baseline::Cpl, lead_score)?;

    if cpl.baseline_rev_per_opp > standard.baseline_rev_per_opp {
        Ok(Baseline::Cpl)
    } else {
        Ok(Baseline::Standard)
    }
}

/// Improvement per opp against the harder baseline at `lead_score`
pub fn metric(analysis: &LeadScoreAnalysis, lead_score: i32) -> Result<f64> {
    let baseline = harder_baseline(analysis, lead_score)?;
    Ok(lookup(analysis, baseline, lead_score)?.rev_per_opp_improvement)
}

fn lookup(analysis: &LeadScoreAnalysis, baseline: Baseline, lead_score: i32) -> Result<&FinancialMetrics> {
    analysis
        .get(baseline)
        .get(&lead_score)
        .ok_or_else(|| EvaluationError::MissingLeadScore {
            lead_score,
            baseline: baseline.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(baseline_rev_per_opp: f64, rev_per_opp_improvement: f64) -> FinancialMetrics {
        FinancialMetrics {
            baseline_rev_per_opp,
            rev_per_opp_improvement,
            ..Default::default()
        }
    }

    fn analysis(standard: FinancialMetrics, cpl: FinancialMetrics) -> LeadScoreAnalysis {
        let mut a = LeadScoreAnalysis::default();
        a.standard.insert(10, standard);
        a.cpl.insert(10, cpl);
        a
    }

    #[test]
    fn test_picks_higher_baseline() {
        let a = analysis(metrics(20.0, 15.0), metrics(35.0, 4.0));
        assert_eq!(harder_baseline(&a, 10).unwrap(), Baseline::Cpl);
        assert_eq!(metric(&a, 10).unwrap(), 4.0);

        let a = analysis(metrics(40.0, 1.5), metrics(35.0, 6.5));
        assert_eq!(metric(&a, 10).unwrap(), 1.5);
    }

    #[test]
    fn test_tie_prefers_standard() {
        let a = analysis(metrics(30.0, 12.0), metrics(30.0, 9.0));
        assert_eq!(harder_baseline(&a, 10).unwrap(), Baseline::Standard);
        assert_eq!(metric(&a, 10).unwrap(), 12.0);
    }

    #[test]
    fn test_missing_lead_score() {
        let a = analysis(metrics(1.0, 1.0), metrics(1.0, 1.0));
        assert!(matches!(
            metric(&a, 11),
            Err(EvaluationError::MissingLeadScore { lead_score: 11, .. })
        ));
    }
}
