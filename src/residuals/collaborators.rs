//! Interfaces to the models and data sources the evaluator depends on
//!
//! Model training and serving live outside this crate. The evaluator only
//! needs predictions, so each external system is reduced to a small trait.
//! File-backed implementations cover the common case of pre-scored exports.

use crate::error::{EvaluationError, Result};
use crate::validation::loader::parse_optional;
use crate::validation::FeatureFrame;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Predictions returned by the model router
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutedPredictions {
    pub prediction: Vec<f64>,
    /// Per-row work threshold, only present for decorated predictions
    pub min_prediction: Option<Vec<Option<f64>>>,
}

/// Routes each row to the production model for its segment
pub trait ModelRouter {
    fn predict(&self, features: &FeatureFrame, decorated: bool) -> Result<RoutedPredictions>;
}

/// Features, labels and categorical column names packaged for a model
#[derive(Debug, Clone)]
pub struct FeaturePool<'a> {
    pub features: &'a FeatureFrame,
    pub labels: &'a [f64],
    pub cat_features: Vec<String>,
}

/// A trained model supplied directly by the caller
pub trait TrainedModel {
    /// One prediction per pool row; classifiers return 0.0 / 1.0
    fn predict(&self, pool: &FeaturePool<'_>) -> Result<Vec<f64>>;

    /// Indices into `feature_names` of the categorical features seen in training
    fn cat_feature_indices(&self) -> Vec<usize>;

    fn feature_names(&self) -> Vec<String>;
}

/// Ground-truth dollar revenue, used to score classifiers
pub trait RevenueSource {
    fn revenue(&self) -> Result<Vec<Option<f64>>>;
}

impl RevenueSource for Vec<Option<f64>> {
    fn revenue(&self) -> Result<Vec<Option<f64>>> {
        Ok(self.clone())
    }
}

/// Router backed by a pre-scored export with `PREDICTION` and optional
/// `MIN_PREDICTION` columns, row-aligned with the validation set
#[derive(Debug, Clone)]
pub struct CsvModelRouter {
    prediction: Vec<f64>,
    min_prediction: Option<Vec<Option<f64>>>,
}

impl CsvModelRouter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();
        let pred_idx = headers
            .iter()
            .position(|h| h == "PREDICTION")
            .ok_or_else(|| EvaluationError::MissingColumn("PREDICTION".to_string()))?;
        let min_idx = headers.iter().position(|h| h == "MIN_PREDICTION");

        let mut prediction = Vec::new();
        let mut min_prediction = min_idx.map(|_| Vec::new());

        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            let value = parse_optional(&record[pred_idx], "PREDICTION", row)?.ok_or_else(|| {
                EvaluationError::InvalidFeature {
                    column: "PREDICTION".to_string(),
                    row,
                    reason: "prediction is missing".to_string(),
                }
            })?;
            prediction.push(value);

            if let (Some(idx), Some(values)) = (min_idx, min_prediction.as_mut()) {
                values.push(parse_optional(&record[idx], "MIN_PREDICTION", row)?);
            }
        }

        Ok(Self { prediction, min_prediction })
    }
}

impl ModelRouter for CsvModelRouter {
    fn predict(&self, features: &FeatureFrame, decorated: bool) -> Result<RoutedPredictions> {
        if self.prediction.len() != features.len() {
            return Err(EvaluationError::length_mismatch(
                "scored export",
                features.len(),
                self.prediction.len(),
            ));
        }
        Ok(RoutedPredictions {
            prediction: self.prediction.clone(),
            min_prediction: if decorated { self.min_prediction.clone() } else { None },
        })
    }
}

/// Revenue file with one `ys` value per validation row
#[derive(Debug, Clone)]
pub struct CsvRevenueSource {
    path: PathBuf,
    column: String,
}

impl CsvRevenueSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            column: "ys".to_string(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

impl RevenueSource for CsvRevenueSource {
    fn revenue(&self) -> Result<Vec<Option<f64>>> {
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let headers = rdr.headers()?.clone();
        let idx = headers
            .iter()
            .position(|h| h == self.column)
            .ok_or_else(|| EvaluationError::MissingColumn(self.column.clone()))?;

        let mut values = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            values.push(parse_optional(&record[idx], &self.column, row)?);
        }
        log::debug!("Read {} revenue values from {}", values.len(), self.path.display());
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FeatureValue;
    use std::io::Write;

    fn frame(n: usize) -> FeatureFrame {
        FeatureFrame::new(
            vec!["LEAD_SCORE".to_string()],
            (0..n).map(|_| vec![FeatureValue::Number(10.0)]).collect(),
        )
    }

    #[test]
    fn test_router_decorated_output() {
        let csv = "PREDICTION,MIN_PREDICTION\n350.5,300\n-12,\n";
        let router = CsvModelRouter::from_reader(csv.as_bytes()).unwrap();

        let decorated = router.predict(&frame(2), true).unwrap();
        assert_eq!(decorated.prediction, vec![350.5, -12.0]);
        assert_eq!(decorated.min_prediction, Some(vec![Some(300.0), None]));

        let plain = router.predict(&frame(2), false).unwrap();
        assert!(plain.min_prediction.is_none());
    }

    #[test]
    fn test_router_row_count_must_match() {
        let router = CsvModelRouter::from_reader("PREDICTION\n1\n".as_bytes()).unwrap();
        assert!(matches!(
            router.predict(&frame(3), true),
            Err(EvaluationError::LengthMismatch { expected: 3, actual: 1, .. })
        ));
    }

    #[test]
    fn test_revenue_file_blanks_are_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "id,ys\n1,120\n2,\n3,0\n").unwrap();
        file.flush().unwrap();

        let values = CsvRevenueSource::new(file.path()).revenue().unwrap();
        assert_eq!(values, vec![Some(120.0), None, Some(0.0)]);
    }

    #[test]
    fn test_revenue_file_custom_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "ys,REVENUE\n1,250\n2,nan\n").unwrap();
        file.flush().unwrap();

        let source = CsvRevenueSource::new(file.path()).with_column("REVENUE");
        assert_eq!(source.revenue().unwrap(), vec![Some(250.0), None]);

        let missing = CsvRevenueSource::new(file.path()).with_column("DOLLARS");
        assert!(matches!(missing.revenue(), Err(EvaluationError::MissingColumn(c)) if c == "DOLLARS"));
    }
}
