//! ShiftWatch: Workforce Staffing Operational Intelligence
//!
//! Batch analysis of recorded workforce hours against an expected-hours
//! model, surfacing staffing exceptions for healthcare facilities.
//!
//! ## Architecture
//!
//! - **Window Resolver**: analysis date range from control variables and the
//!   dataset's own date axis
//! - **Variance Detector**: model deviation + statistical out-of-control
//!   points (facility and employee level)
//! - **Trend Analyzer**: trailing-window OLS trend per facility/role
//! - **Exception Compiler**: unified, scored, deterministically ordered
//!   exception stream
//! - **Ingestion**: thin CSV front-end with typed, fallible parsing

pub mod calendar;
pub mod config;
pub mod engine;
pub mod ingestion;
pub mod stats;
pub mod types;

// Re-export the engine surface
pub use engine::{
    run, AnalysisReport, DateWindow, EngineError, ExceptionCompiler, TrendAnalyzer,
    VarianceDetector, WindowOverride,
};

// Re-export commonly used types
pub use config::ControlVariables;
pub use types::{
    ControlLimits, ControlMethod, ExceptionKind, ExceptionRecord, ExpectedHours,
    ExpectedHoursEntry, ExpectedHoursTable, GroupSummary, HoursSample, Normality, TrendDirection,
    TrendRecord, VarianceKind, VariancePercent, VarianceRecord,
};

// Re-export ingestion
pub use ingestion::{load_hours_csv, load_model_csv, DataQualityEvent, IngestError};
