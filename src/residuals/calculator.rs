//! Build the analysis table from a validation set and a model

use super::collaborators::{FeaturePool, ModelRouter, RevenueSource, RoutedPredictions, TrainedModel};
use super::table::{AnalysisRow, AnalysisTable};
use crate::error::{EvaluationError, Result};
use crate::validation::{ModelKind, ValidationSet};

/// External systems consulted while computing residuals
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Used when the caller does not hand over a trained model
    pub router: &'a dyn ModelRouter,
    /// Dollar revenue for classifier evaluation
    pub revenue: Option<&'a dyn RevenueSource>,
}

/// Join predictions with ground truth and CPL revenue
///
/// # Arguments
/// * `data` - Held-out features, labels and CPL revenue
/// * `segment` - Segment the evaluation is run for (carried on the table)
/// * `model` - Trained model; `None` routes through `collaborators.router`
/// * `kind` - Classifier or regressor semantics
///
/// # Returns
/// One analysis row per validation row, in input order
pub fn calculate_residuals(
    data: &ValidationSet,
    segment: &str,
    model: Option<&dyn TrainedModel>,
    collaborators: Collaborators<'_>,
    kind: ModelKind,
) -> Result<AnalysisTable> {
    let n = data.len();
    check_len("labels", n, data.labels.len())?;
    check_len("CPL revenue", n, data.cpl_revenue.len())?;
    let lead_scores = data.features.lead_scores()?;

    let RoutedPredictions { prediction, min_prediction } = match model {
        None => {
            log::info!("Routing {} rows through the model router", n);
            collaborators.router.predict(&data.features, true)?
        }
        Some(model) => {
            log::info!("Predicting {} rows", n);
            let pool = build_pool(data, model)?;
            RoutedPredictions {
                prediction: model.predict(&pool)?,
                min_prediction: None,
            }
        }
    };
    check_len("predictions", n, prediction.len())?;
    if let Some(row) = prediction.iter().position(|p| !p.is_finite()) {
        return Err(non_finite_prediction(row, prediction[row]));
    }
    if let Some(min_prediction) = &min_prediction {
        check_len("MIN_PREDICTION", n, min_prediction.len())?;
    }

    let actual: Vec<f64> = match kind {
        ModelKind::Classifier => {
            let source = collaborators.revenue.ok_or_else(|| {
                EvaluationError::Collaborator("classifier evaluation needs a revenue source".to_string())
            })?;
            let revenue = source.revenue()?;
            check_len("revenue source", n, revenue.len())?;
            revenue.into_iter().map(|v| v.unwrap_or(0.0)).collect()
        }
        ModelKind::Regressor => data.labels.clone(),
    };

    let rows = (0..n)
        .map(|i| {
            let (predicted, residual) = match kind {
                // Residuals are not meaningful for labels
                ModelKind::Classifier => (prediction[i], 0.0),
                ModelKind::Regressor => {
                    let clipped = prediction[i].max(0.0);
                    (clipped, (clipped - actual[i]).abs())
                }
            };
            AnalysisRow {
                lead_score: lead_scores[i],
                actual: actual[i],
                predicted,
                cpl_revenue: data.cpl_revenue[i].unwrap_or(0.0),
                residual,
                min_prediction: min_prediction.as_ref().and_then(|m| m[i]),
            }
        })
        .collect();

    Ok(AnalysisTable::new(segment, kind, rows))
}

/// Resolve the model's categorical indices to column names and package the pool
fn build_pool<'a>(data: &'a ValidationSet, model: &dyn TrainedModel) -> Result<FeaturePool<'a>> {
    let names = model.feature_names();
    let cat_features = model
        .cat_feature_indices()
        .into_iter()
        .map(|index| {
            names
                .get(index)
                .cloned()
                .ok_or(EvaluationError::InvalidCategoricalIndex { index, len: names.len() })
        })
        .collect::<Result<Vec<_>>>()?;

    for name in &cat_features {
        if data.features.column_index(name).is_none() {
            return Err(EvaluationError::MissingColumn(name.clone()));
        }
    }

    Ok(FeaturePool {
        features: &data.features,
        labels: &data.labels,
        cat_features,
    })
}

pub(crate) fn non_finite_prediction(row: usize, value: f64) -> EvaluationError {
    EvaluationError::InvalidFeature {
        column: "PREDICTION".to_string(),
        row,
        reason: format!("prediction {value} is not finite"),
    }
}

fn check_len(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EvaluationError::length_mismatch(what, expected, actual))
    }
}
