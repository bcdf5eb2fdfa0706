//! CSV ingestion for the hours and expected-hours tables.
//!
//! Thin by design: the engine owns no file format, so these loaders only
//! map rows onto typed records. Parsing is fallible per field — a bad value
//! becomes a [`DataQualityEvent`] and the row is excluded from analysis,
//! never silently coerced. Only a missing required column is fatal (the
//! upstream extract broke its contract).

mod hours;
mod model;
mod quality;

pub use hours::load_hours_csv;
pub use model::load_model_csv;
pub use quality::{DataQualityEvent, QualityIssue};

use thiserror::Error;

/// Fatal ingestion errors.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("required column '{column}' missing from {table} table")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("failed to read CSV")]
    Csv(#[from] csv::Error),
}

/// Parse a date in ISO (`2025-05-24`) or US (`05/24/2025`) form.
pub(crate) fn parse_date(raw: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| chrono::NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}
