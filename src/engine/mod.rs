//! The analysis engine: date-window resolution, variance detection, trend
//! analysis, and exception compilation over one immutable snapshot of the
//! hours and model tables.
//!
//! One call to [`run`] is one complete batch analysis. The engine never
//! mutates its inputs, never raises on a noisy or sparse group, and fails
//! only when a structural precondition is missing (no data, degenerate
//! window, invalid control variables).

pub mod exceptions;
pub mod trends;
pub mod variance;
pub mod window;

pub use exceptions::ExceptionCompiler;
pub use trends::TrendAnalyzer;
pub use variance::VarianceDetector;
pub use window::{DateWindow, WindowOverride};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, ControlVariables};
use crate::stats::{control, descriptive};
use crate::types::{ExceptionRecord, ExpectedHoursTable, GroupSummary, HoursSample, TrendRecord};

/// Fatal engine errors: the input contract was violated upstream.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("dataset contains no hours samples; no date axis to analyze")]
    EmptyDataset,
    #[error("degenerate analysis window: start {start} is not before end {end}")]
    DegenerateWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The resolved analysis window that filtered the dataset.
    pub window: DateWindow,
    /// Compiled exception stream, sorted by the §reporting contract:
    /// facility ascending, severity descending, date descending.
    pub exceptions: Vec<ExceptionRecord>,
    /// Per-(facility, role) control limits and descriptive statistics.
    pub summaries: Vec<GroupSummary>,
    /// Trend fit per (facility, role) with enough trailing data.
    pub trends: Vec<TrendRecord>,
}

/// Run the full engine over an hours snapshot.
///
/// A completed run always returns a (possibly empty) exception list; partial
/// failures inside individual groups are logged and skipped, never surfaced
/// as errors.
pub fn run(
    samples: &[HoursSample],
    model: &ExpectedHoursTable,
    vars: &ControlVariables,
    window_override: WindowOverride,
) -> Result<AnalysisReport, EngineError> {
    let mut warnings = Vec::new();
    vars.validate(&mut warnings)?;
    for warning in &warnings {
        warn!(field = warning.field, "{warning}");
    }

    let window = window::resolve(samples, vars, window_override)?;
    info!(
        start = %window.start,
        end = %window.end,
        span_days = window.span_days(),
        "analysis window resolved"
    );

    let mut in_window: Vec<HoursSample> = samples
        .iter()
        .filter(|s| window.contains(s.date))
        .cloned()
        .collect();
    in_window.sort_by(|a, b| a.date.cmp(&b.date));
    info!(
        total = samples.len(),
        in_window = in_window.len(),
        "dataset filtered to analysis window"
    );

    let summaries = group_summaries(&in_window);
    let variances = VarianceDetector::detect_all(&in_window, model, vars);
    let trends = TrendAnalyzer::analyze_all(&in_window, vars);
    let exceptions = ExceptionCompiler::compile(&variances, &trends);

    info!(
        groups = summaries.len(),
        variances = variances.len(),
        trends = trends.len(),
        exceptions = exceptions.len(),
        "analysis run complete"
    );

    Ok(AnalysisReport {
        window,
        exceptions,
        summaries,
        trends,
    })
}

/// Group samples by (facility, role), preserving key order.
///
/// Each group's samples keep the caller's (date-sorted) order.
pub(crate) fn group_by_facility_role(
    samples: &[HoursSample],
) -> BTreeMap<(&str, &str), Vec<&HoursSample>> {
    let mut groups: BTreeMap<(&str, &str), Vec<&HoursSample>> = BTreeMap::new();
    for sample in samples {
        groups
            .entry((sample.facility.as_str(), sample.role.as_str()))
            .or_default()
            .push(sample);
    }
    groups
}

/// Descriptive statistics + control limits per (facility, role).
fn group_summaries(samples: &[HoursSample]) -> Vec<GroupSummary> {
    group_by_facility_role(samples)
        .into_iter()
        .map(|((facility, role), group)| {
            let hours: Vec<f64> = group.iter().map(|s| s.actual_hours).collect();
            GroupSummary {
                facility: facility.to_string(),
                role: role.to_string(),
                stats: descriptive::describe(&hours),
                limits: control::control_limits(&hours),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(facility: &str, role: &str, date: (i32, u32, u32), hours: f64) -> HoursSample {
        HoursSample {
            facility: facility.to_string(),
            role: role.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            actual_hours: hours,
            employee_id: None,
            employee_name: None,
        }
    }

    #[test]
    fn empty_dataset_is_fatal() {
        let result = run(
            &[],
            &ExpectedHoursTable::new(),
            &ControlVariables::default(),
            WindowOverride::default(),
        );
        assert!(matches!(result, Err(EngineError::EmptyDataset)));
    }

    #[test]
    fn invalid_control_variables_are_fatal() {
        let samples = vec![sample("North", "RN", (2025, 5, 1), 8.0)];
        let vars = ControlVariables {
            new_data_day: 9,
            ..ControlVariables::default()
        };
        let result = run(
            &samples,
            &ExpectedHoursTable::new(),
            &vars,
            WindowOverride::default(),
        );
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn run_returns_report_even_with_no_exceptions() {
        // A short, uniform dataset: nothing to flag, but the run completes.
        let samples: Vec<HoursSample> = (1..=14)
            .map(|d| sample("North", "RN", (2025, 5, d), 8.0))
            .collect();
        let vars = ControlVariables {
            use_data_day: false,
            days_to_drop: 0,
            days_to_process: 14,
            ..ControlVariables::default()
        };

        let report = run(
            &samples,
            &ExpectedHoursTable::new(),
            &vars,
            WindowOverride::default(),
        )
        .unwrap();

        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.window.span_days(), 14);
    }

    #[test]
    fn groups_iterate_in_key_order() {
        let samples = vec![
            sample("South", "RN", (2025, 5, 1), 8.0),
            sample("North", "Aide", (2025, 5, 1), 6.0),
            sample("North", "RN", (2025, 5, 1), 8.0),
        ];
        let keys: Vec<(&str, &str)> = group_by_facility_role(&samples).into_keys().collect();
        assert_eq!(
            keys,
            vec![("North", "Aide"), ("North", "RN"), ("South", "RN")]
        );
    }
}
