//! Load validation sets from CSV

use super::data::{FeatureFrame, FeatureValue, ValidationSet};
use crate::error::{EvaluationError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns holding the ground truth for each validation row
#[derive(Debug, Clone)]
pub struct TargetColumns {
    /// Realised dollar revenue
    pub label: String,
    /// CPL revenue for the lead (may be blank)
    pub cpl_revenue: String,
}

impl Default for TargetColumns {
    fn default() -> Self {
        Self {
            label: "ys".to_string(),
            cpl_revenue: "ys_cpl".to_string(),
        }
    }
}

/// Load a validation set from a CSV file
///
/// Every column other than the two target columns becomes a feature.
pub fn load_validation_set(path: impl AsRef<Path>, targets: &TargetColumns) -> Result<ValidationSet> {
    let file = File::open(path.as_ref())?;
    load_validation_set_from_reader(file, targets)
}

/// Load a validation set from any reader producing CSV with headers
pub fn load_validation_set_from_reader<R: Read>(reader: R, targets: &TargetColumns) -> Result<ValidationSet> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| EvaluationError::MissingColumn(name.to_string()))
    };
    let label_idx = find(&targets.label)?;
    let cpl_idx = find(&targets.cpl_revenue)?;

    let feature_idx: Vec<usize> = (0..headers.len())
        .filter(|&i| i != label_idx && i != cpl_idx)
        .collect();
    let columns = feature_idx.iter().map(|&i| headers[i].to_string()).collect();

    let mut rows = Vec::new();
    let mut labels = Vec::new();
    let mut cpl_revenue = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        rows.push(feature_idx.iter().map(|&i| FeatureValue::parse(&record[i])).collect());

        let label = parse_optional(&record[label_idx], &targets.label, row)?;
        labels.push(label.unwrap_or(0.0));
        cpl_revenue.push(parse_optional(&record[cpl_idx], &targets.cpl_revenue, row)?);
    }

    log::info!("Loaded {} validation rows with {} features", rows.len(), feature_idx.len());
    Ok(ValidationSet::new(FeatureFrame::new(columns, rows), labels, cpl_revenue))
}

/// Blank and NaN fields are missing; anything else must be numeric
pub(crate) fn parse_optional(raw: &str, column: &str, row: usize) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|e| EvaluationError::InvalidFeature {
            column: column.to_string(),
            row,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
LEAD_SCORE,STATE,LOAN_AMOUNT,ys,ys_cpl
10,CA,25000,200,
11,NY,,0,45.5
8,TX,12000,,nan
";

    #[test]
    fn test_load_from_reader() {
        let set = load_validation_set_from_reader(CSV.as_bytes(), &TargetColumns::default()).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.features.columns, vec!["LEAD_SCORE", "STATE", "LOAN_AMOUNT"]);
        assert_eq!(set.features.rows[1][2], FeatureValue::Missing);
        assert_eq!(set.features.lead_scores().unwrap(), vec![10, 11, 8]);
        assert_eq!(set.labels, vec![200.0, 0.0, 0.0]);
        assert_eq!(set.cpl_revenue, vec![None, Some(45.5), None]);
    }

    #[test]
    fn test_missing_target_column() {
        let targets = TargetColumns {
            label: "REVENUE".to_string(),
            ..Default::default()
        };
        let err = load_validation_set_from_reader(CSV.as_bytes(), &targets).unwrap_err();
        assert!(matches!(err, EvaluationError::MissingColumn(c) if c == "REVENUE"));
    }

    #[test]
    fn test_non_numeric_target() {
        let csv = "LEAD_SCORE,ys,ys_cpl\n10,lots,0\n";
        let err = load_validation_set_from_reader(csv.as_bytes(), &TargetColumns::default()).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidFeature { row: 0, .. }));
    }
}
