//! Error type shared by the evaluation core

use thiserror::Error;

/// Errors raised while building analysis tables, comparing baselines,
/// gating or searching thresholds.
///
/// Numeric edge cases (empty lead-score segments) never surface here; they are
/// guarded where they occur. Everything below is a configuration or input
/// problem the caller has to fix.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Requested lead-score range is inverted
    #[error("invalid lead score range: min {min} is greater than max {max}")]
    InvalidSegment { min: i32, max: i32 },

    /// Regressor threshold mapping has no entry for a lead score in range
    #[error("no minimum prediction threshold for lead score {lead_score}")]
    MissingPredictionThreshold { lead_score: i32 },

    /// Production gate was asked to run without a reference rev per opp
    #[error("reference rev per opp is not configured; pass it explicitly or set gate.reference_rev_per_opp")]
    UndefinedReference,

    #[error("invalid date cutoff '{value}': expected YYYY-MM-DD")]
    InvalidDateCutoff {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A breakdown does not contain the requested lead score
    #[error("lead score {lead_score} missing from the {baseline} breakdown")]
    MissingLeadScore { lead_score: i32, baseline: String },

    /// Search bounds for a parameter are reversed
    #[error("invalid search bounds for {param}: low {low} is greater than high {high}")]
    InvalidSearchBounds { param: String, low: i64, high: i64 },

    #[error("threshold search finished without a completed trial")]
    NoCompletedTrials,

    #[error("length mismatch: {what} has {actual} rows, expected {expected}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("invalid value in column '{column}' at row {row}: {reason}")]
    InvalidFeature {
        column: String,
        row: usize,
        reason: String,
    },

    /// Model reported a categorical index outside its own feature names
    #[error("categorical feature index {index} out of range for {len} feature names")]
    InvalidCategoricalIndex { index: usize, len: usize },

    /// Failure reported by a model, router or revenue source
    #[error("collaborator failure: {0}")]
    Collaborator(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EvaluationError>;

impl EvaluationError {
    pub(crate) fn length_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let err = EvaluationError::MissingPredictionThreshold { lead_score: 9 };
        assert_eq!(err.to_string(), "no minimum prediction threshold for lead score 9");

        let err = EvaluationError::length_mismatch("CPL revenue", 4, 3);
        assert_eq!(err.to_string(), "length mismatch: CPL revenue has 3 rows, expected 4");
    }

    #[test]
    fn test_date_cutoff_keeps_source() {
        let source = chrono::NaiveDate::parse_from_str("08/01/2023", "%Y-%m-%d").unwrap_err();
        let err = EvaluationError::InvalidDateCutoff {
            value: "08/01/2023".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("08/01/2023"));
    }
}
