//! Post-hoc search diagnostics (data only; plotting happens elsewhere)

use super::search::Study;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of objective variance explained by one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamImportance {
    pub param: String,
    pub importance: f64,
}

/// Correlation-ratio importances, normalised to sum to 1, largest first
///
/// For each parameter, trials are grouped by the value it took and the
/// between-group variance of the objective is divided by the total variance.
/// A flat objective gives every parameter an importance of 0.
pub fn param_importances(study: &Study) -> Vec<ParamImportance> {
    let trials: Vec<_> = study.trials.iter().filter(|t| t.value.is_finite()).collect();
    if trials.is_empty() {
        return Vec::new();
    }

    let n = trials.len() as f64;
    let mean = trials.iter().map(|t| t.value).sum::<f64>() / n;
    let total_ss: f64 = trials.iter().map(|t| (t.value - mean).powi(2)).sum();

    let mut names: Vec<&String> = trials.iter().flat_map(|t| t.params.keys()).collect();
    names.sort();
    names.dedup();

    let mut importances: Vec<ParamImportance> = names
        .into_iter()
        .map(|name| {
            let mut groups: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
            for t in &trials {
                if let Some(&v) = t.params.get(name) {
                    let entry = groups.entry(v).or_insert((0.0, 0));
                    entry.0 += t.value;
                    entry.1 += 1;
                }
            }
            let between_ss: f64 = groups
                .values()
                .map(|&(sum, count)| count as f64 * (sum / count as f64 - mean).powi(2))
                .sum();
            let importance = if total_ss > 0.0 { between_ss / total_ss } else { 0.0 };
            ParamImportance {
                param: name.clone(),
                importance,
            }
        })
        .collect();

    let total: f64 = importances.iter().map(|p| p.importance).sum();
    if total > 0.0 {
        for p in &mut importances {
            p.importance /= total;
        }
    }
    importances.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    importances
}

/// Best objective value observed at each (x, y) combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourGrid {
    pub x_param: String,
    pub y_param: String,
    /// Distinct observed x values, ascending
    pub x_values: Vec<i64>,
    /// Distinct observed y values, ascending
    pub y_values: Vec<i64>,
    /// `z[yi][xi]`, `None` where no trial landed
    pub z: Vec<Vec<Option<f64>>>,
}

pub fn contour(study: &Study, x_param: &str, y_param: &str) -> ContourGrid {
    let mut cells: BTreeMap<(i64, i64), f64> = BTreeMap::new();
    for t in study.trials.iter().filter(|t| !t.value.is_nan()) {
        if let (Some(&x), Some(&y)) = (t.params.get(x_param), t.params.get(y_param)) {
            let cell = cells.entry((x, y)).or_insert(t.value);
            *cell = cell.max(t.value);
        }
    }

    let mut x_values: Vec<i64> = cells.keys().map(|&(x, _)| x).collect();
    x_values.sort_unstable();
    x_values.dedup();
    let mut y_values: Vec<i64> = cells.keys().map(|&(_, y)| y).collect();
    y_values.sort_unstable();
    y_values.dedup();

    let z = y_values
        .iter()
        .map(|&y| x_values.iter().map(|&x| cells.get(&(x, y)).copied()).collect())
        .collect();

    ContourGrid {
        x_param: x_param.to_string(),
        y_param: y_param.to_string(),
        x_values,
        y_values,
        z,
    }
}

/// Contours for every pair of the given parameters
pub fn pairwise_contours(study: &Study, params: &[&str]) -> Vec<ContourGrid> {
    let mut grids = Vec::new();
    for (i, x) in params.iter().enumerate() {
        for y in &params[i + 1..] {
            grids.push(contour(study, x, y));
        }
    }
    grids
}
