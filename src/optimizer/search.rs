//! Black-box integer search
//!
//! The objective asks a [`Trial`] for parameter values and returns a score to
//! maximize. [`SequentialSearch`] samples the first trials uniformly, then
//! mostly proposes values close to one of the best trials seen so far. The
//! proposal width shrinks as the search progresses.

use crate::error::{EvaluationError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameter source handed to the objective
pub trait Trial {
    /// Integer in `low..=high`; a reversed range collapses to `low`
    fn suggest_int(&mut self, name: &str, low: i64, high: i64) -> i64;
}

/// Objective callback: score for one trial, higher is better
pub type Objective<'a> = dyn FnMut(&mut dyn Trial) -> Result<f64> + 'a;

/// Progress callback, called after every completed trial
pub type Progress<'a> = dyn FnMut(&TrialRecord) + 'a;

/// A maximizing search strategy
pub trait SearchEngine {
    fn optimize(
        &mut self,
        objective: &mut Objective<'_>,
        n_trials: usize,
        progress: Option<&mut Progress<'_>>,
    ) -> Result<Study>;
}

/// One completed trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub number: usize,
    pub params: BTreeMap<String, i64>,
    pub value: f64,
}

/// Every completed trial of a search, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub trials: Vec<TrialRecord>,
}

impl Study {
    /// Highest-valued trial; earliest wins ties, NaN values never win
    pub fn best_trial(&self) -> Option<&TrialRecord> {
        self.trials
            .iter()
            .filter(|t| !t.value.is_nan())
            .fold(None, |best: Option<&TrialRecord>, t| match best {
                Some(b) if b.value >= t.value => Some(b),
                _ => Some(t),
            })
    }

    pub fn best_value(&self) -> Result<f64> {
        self.best_trial().map(|t| t.value).ok_or(EvaluationError::NoCompletedTrials)
    }

    pub fn best_params(&self) -> Result<&BTreeMap<String, i64>> {
        self.best_trial().map(|t| &t.params).ok_or(EvaluationError::NoCompletedTrials)
    }

    /// Trials sorted best first
    pub fn ranked(&self) -> Vec<&TrialRecord> {
        let mut ranked: Vec<&TrialRecord> = self.trials.iter().filter(|t| !t.value.is_nan()).collect();
        ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
        ranked
    }
}

/// Startup-then-exploit sampler
pub struct SequentialSearch {
    rng: StdRng,
    n_startup_trials: usize,
    /// Share of completed trials treated as "good"
    gamma: f64,
    /// Chance of a uniform draw after startup
    explore_prob: f64,
}

impl SequentialSearch {
    /// `seed` fixes the random stream; `None` seeds from entropy
    pub fn new(seed: Option<u64>, n_startup_trials: usize) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            n_startup_trials,
            gamma: 0.25,
            explore_prob: 0.1,
        }
    }

    fn guide(&mut self, study: &Study) -> Option<BTreeMap<String, i64>> {
        if study.trials.len() < self.n_startup_trials.max(1) || self.rng.gen::<f64>() < self.explore_prob {
            return None;
        }
        let ranked = study.ranked();
        if ranked.is_empty() {
            return None;
        }
        let n_good = ((ranked.len() as f64 * self.gamma).ceil() as usize).clamp(1, ranked.len());
        let pick = self.rng.gen_range(0..n_good);
        Some(ranked[pick].params.clone())
    }
}

struct SampledTrial<'a> {
    rng: &'a mut StdRng,
    guide: Option<BTreeMap<String, i64>>,
    /// Proposal half-width as a share of each parameter's range
    bandwidth: f64,
    params: BTreeMap<String, i64>,
}

impl Trial for SampledTrial<'_> {
    fn suggest_int(&mut self, name: &str, low: i64, high: i64) -> i64 {
        let high = high.max(low);
        let value = match self.guide.as_ref().and_then(|g| g.get(name)) {
            Some(&center) => {
                let spread = (((high - low) as f64 * self.bandwidth).round() as i64).max(1);
                let center = center.clamp(low, high);
                let lo = (center - spread).max(low);
                let hi = (center + spread).min(high);
                self.rng.gen_range(lo..=hi)
            }
            None => self.rng.gen_range(low..=high),
        };
        self.params.insert(name.to_string(), value);
        value
    }
}

impl SearchEngine for SequentialSearch {
    fn optimize(
        &mut self,
        objective: &mut Objective<'_>,
        n_trials: usize,
        mut progress: Option<&mut Progress<'_>>,
    ) -> Result<Study> {
        let mut study = Study::default();

        for number in 0..n_trials {
            let guide = self.guide(&study);
            // Narrow from 20% to 5% of the range over the search
            let bandwidth = 0.2 - 0.15 * (number as f64 / n_trials.max(1) as f64);

            let mut trial = SampledTrial {
                rng: &mut self.rng,
                guide,
                bandwidth,
                params: BTreeMap::new(),
            };
            let value = objective(&mut trial)?;
            let record = TrialRecord {
                number,
                params: trial.params,
                value,
            };

            log::debug!("Trial {} finished with value {:.4}: {:?}", number, value, record.params);
            if let Some(cb) = progress.as_deref_mut() {
                cb(&record);
            }
            study.trials.push(record);
        }

        Ok(study)
    }
}
