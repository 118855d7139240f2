//! Residual calculation: predictions joined with outcomes per lead

mod table;
mod calculator;
pub mod collaborators;

pub use table::{AnalysisRow, AnalysisTable, MinPredictionMap};
pub use calculator::{calculate_residuals, Collaborators};
pub use collaborators::{
    CsvModelRouter, CsvRevenueSource, FeaturePool, ModelRouter, RevenueSource, RoutedPredictions, TrainedModel,
};
