//! Analysis table: predictions joined with ground truth

use super::calculator::non_finite_prediction;
use crate::error::Result;
use crate::validation::{HistoricalRecord, ModelKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum prediction required to work a lead, by lead score
pub type MinPredictionMap = BTreeMap<i32, f64>;

/// One validation lead after prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub lead_score: i32,
    /// Realised dollar revenue
    pub actual: f64,
    /// Model output (revenue estimate, or 0.0 / 1.0 label for classifiers)
    pub predicted: f64,
    /// CPL revenue, missing values already filled with 0
    pub cpl_revenue: f64,
    /// |predicted - actual| for regressors, always 0 for classifiers
    pub residual: f64,
    /// Per-row threshold supplied by the model router, if any
    pub min_prediction: Option<f64>,
}

/// Ordered analysis rows for one evaluation call
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTable {
    pub segment: String,
    pub kind: ModelKind,
    pub rows: Vec<AnalysisRow>,
}

impl AnalysisTable {
    pub fn new(segment: impl Into<String>, kind: ModelKind, rows: Vec<AnalysisRow>) -> Self {
        Self {
            segment: segment.into(),
            kind,
            rows,
        }
    }

    /// Regressor table built from historical scored leads
    ///
    /// Fails on the first record whose prediction is NaN or infinite.
    pub fn from_history(segment: impl Into<String>, records: &[HistoricalRecord]) -> Result<Self> {
        let rows = records
            .iter()
            .enumerate()
            .map(|(row, r)| {
                if !r.predicted.is_finite() {
                    return Err(non_finite_prediction(row, r.predicted));
                }
                let predicted = r.predicted.max(0.0);
                Ok(AnalysisRow {
                    lead_score: r.lead_score,
                    actual: r.actual,
                    predicted,
                    cpl_revenue: r.cpl_revenue.unwrap_or(0.0),
                    residual: (predicted - r.actual).abs(),
                    min_prediction: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(segment, ModelKind::Regressor, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows at one lead score, in table order
    pub fn segment_rows(&self, lead_score: i32) -> Vec<&AnalysisRow> {
        self.rows.iter().filter(|r| r.lead_score == lead_score).collect()
    }

    /// True when the router attached thresholds to the rows
    pub fn has_min_prediction(&self) -> bool {
        self.rows.iter().any(|r| r.min_prediction.is_some())
    }

    /// First non-missing router threshold for every lead score present
    pub fn min_prediction_by_lead_score(&self) -> MinPredictionMap {
        let mut map = MinPredictionMap::new();
        for row in &self.rows {
            if let Some(threshold) = row.min_prediction {
                map.entry(row.lead_score).or_insert(threshold);
            }
        }
        map
    }

    /// Mean absolute residual across all rows (0 for an empty table)
    pub fn mean_absolute_error(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.rows.iter().map(|r| r.residual).sum::<f64>() / self.rows.len() as f64
    }
}
