//! Historical scored leads used by the threshold search

use crate::error::{EvaluationError, Result};
use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One historical lead with the score the model gave it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    #[serde(rename = "CREATED_DATE")]
    pub created_date: NaiveDate,
    #[serde(rename = "LEAD_SCORE", deserialize_with = "integral_lead_score")]
    pub lead_score: i32,
    #[serde(rename = "ACTUAL")]
    pub actual: f64,
    #[serde(rename = "PREDICTED")]
    pub predicted: f64,
    #[serde(rename = "CPL_REV", default)]
    pub cpl_revenue: Option<f64>,
}

/// Lead scores may be written as floats (`10.0`) but must be whole numbers
fn integral_lead_score<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(D::Error::custom(format!("lead score must be an integer, got {value}")));
    }
    Ok(value as i32)
}

/// Load historical records from a CSV file
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<HistoricalRecord>> {
    let file = File::open(path.as_ref())?;
    load_history_from_reader(file)
}

pub fn load_history_from_reader<R: Read>(reader: R) -> Result<Vec<HistoricalRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: HistoricalRecord = result?;
        records.push(record);
    }
    log::info!("Loaded {} historical records", records.len());
    Ok(records)
}

/// Parse a `YYYY-MM-DD` cutoff
pub fn parse_date_cutoff(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|source| EvaluationError::InvalidDateCutoff {
        value: value.to_string(),
        source,
    })
}

/// Records created on or after the cutoff
pub fn filter_since(records: &[HistoricalRecord], cutoff: NaiveDate) -> Vec<HistoricalRecord> {
    records
        .iter()
        .filter(|r| r.created_date >= cutoff)
        .cloned()
        .collect()
}
