//! Analysis date-window resolution.
//!
//! Two paths in priority order: an explicit start/end override (testing and
//! manual reruns), then dynamic resolution from the control variables and
//! the dataset's own date axis. The dynamic path has two period-end modes:
//! snap to the most recent "clean data day" (`use_data_day`), or trim a
//! fixed number of days off the most recent date (`days_to_drop`).

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::EngineError;
use crate::calendar::ModelDay;
use crate::config::defaults::MAX_REASONABLE_WINDOW_DAYS;
use crate::config::ControlVariables;
use crate::types::HoursSample;

/// The resolved analysis window, endpoints inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Calendar days covered, both endpoints inclusive.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Optional explicit window endpoints supplied by the caller.
///
/// Both must be present to take effect; a partial override is treated as no
/// override.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowOverride {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Resolve the analysis window.
///
/// Fails only on a missing date axis (empty dataset without a full
/// override) or a degenerate resolved window.
pub fn resolve(
    samples: &[HoursSample],
    vars: &ControlVariables,
    window_override: WindowOverride,
) -> Result<DateWindow, EngineError> {
    match (window_override.start, window_override.end) {
        (Some(start), Some(end)) => {
            info!(%start, %end, "using explicit date window override");
            let window = DateWindow { start, end };
            validate(&window)?;
            return Ok(window);
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("partial date override ignored; both start and end are required");
        }
        (None, None) => {}
    }

    let most_recent = samples
        .iter()
        .map(|s| s.date)
        .max()
        .ok_or(EngineError::EmptyDataset)?;
    debug!(%most_recent, "most recent date in dataset");

    let period_end = if vars.use_data_day {
        most_recent_data_day(samples, vars.new_data_day()).unwrap_or_else(|| {
            warn!(
                target_day = %vars.new_data_day(),
                "no dates fall on the configured data day; using most recent date"
            );
            most_recent
        })
    } else {
        most_recent - Duration::days(i64::from(vars.days_to_drop))
    };

    // Subtract days_to_process - 1 so the window covers exactly
    // days_to_process calendar days including both endpoints.
    let start = period_end - Duration::days(i64::from(vars.days_to_process) - 1);
    let window = DateWindow {
        start,
        end: period_end,
    };
    validate(&window)?;
    Ok(window)
}

/// Most recent date in the dataset falling on `target` day of week.
fn most_recent_data_day(samples: &[HoursSample], target: ModelDay) -> Option<NaiveDate> {
    samples
        .iter()
        .map(|s| s.date)
        .filter(|d| ModelDay::of(*d) == target)
        .max()
}

fn validate(window: &DateWindow) -> Result<(), EngineError> {
    if window.start >= window.end {
        return Err(EngineError::DegenerateWindow {
            start: window.start,
            end: window.end,
        });
    }
    if window.span_days() > MAX_REASONABLE_WINDOW_DAYS {
        warn!(
            span_days = window.span_days(),
            "analysis window is unusually long"
        );
    }
    Ok(())
}
