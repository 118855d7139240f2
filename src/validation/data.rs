//! Held-out validation data structures

use crate::error::{EvaluationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the lead score feature column
pub const LEAD_SCORE_COLUMN: &str = "LEAD_SCORE";

/// Kind of model whose predictions are being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Predicts a worked / not-worked label (0.0 or 1.0)
    Classifier,
    /// Predicts expected revenue; worked when above a per-lead-score threshold
    Regressor,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Classifier => write!(f, "classifier"),
            ModelKind::Regressor => write!(f, "regressor"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classifier" => Ok(ModelKind::Classifier),
            "regressor" => Ok(ModelKind::Regressor),
            other => Err(format!("unknown model kind '{other}' (expected classifier or regressor)")),
        }
    }
}

/// One feature cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
    Missing,
}

impl FeatureValue {
    /// Interpret a raw CSV field: empty is missing, numeric text is a number
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            FeatureValue::Missing
        } else if let Ok(v) = trimmed.parse::<f64>() {
            FeatureValue::Number(v)
        } else {
            FeatureValue::Category(trimmed.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// Row-major feature table handed to models and routers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<FeatureValue>>,
}

impl FeatureFrame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<FeatureValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Integer lead scores, one per row
    ///
    /// Lead scores arrive as numbers (often written as `10.0`); anything
    /// missing or fractional is rejected.
    pub fn lead_scores(&self) -> Result<Vec<i32>> {
        let idx = self
            .column_index(LEAD_SCORE_COLUMN)
            .ok_or_else(|| EvaluationError::MissingColumn(LEAD_SCORE_COLUMN.to_string()))?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row, values)| {
                let invalid = |reason: &str| EvaluationError::InvalidFeature {
                    column: LEAD_SCORE_COLUMN.to_string(),
                    row,
                    reason: reason.to_string(),
                };
                let value = values
                    .get(idx)
                    .and_then(FeatureValue::as_f64)
                    .ok_or_else(|| invalid("lead score must be numeric"))?;
                if value.fract() != 0.0 {
                    return Err(invalid("lead score must be an integer"));
                }
                Ok(value as i32)
            })
            .collect()
    }
}

/// Held-out rows with their ground truth
#[derive(Debug, Clone, Default)]
pub struct ValidationSet {
    pub features: FeatureFrame,
    /// Dollar revenue actually realised (regressor target)
    pub labels: Vec<f64>,
    /// CPL revenue per lead; missing values count as 0
    pub cpl_revenue: Vec<Option<f64>>,
}

impl ValidationSet {
    pub fn new(features: FeatureFrame, labels: Vec<f64>, cpl_revenue: Vec<Option<f64>>) -> Self {
        Self { features, labels, cpl_revenue }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
