//! Validation data structures and loading

mod data;
pub mod loader;
pub mod history;

pub use data::{FeatureFrame, FeatureValue, ModelKind, ValidationSet, LEAD_SCORE_COLUMN};
pub use loader::{load_validation_set, load_validation_set_from_reader, TargetColumns};
pub use history::{filter_since, load_history, load_history_from_reader, parse_date_cutoff, HistoricalRecord};
