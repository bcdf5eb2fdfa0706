//! Engine configuration: control variables, defaults, validation.
//!
//! The control variables are owned by the caller (CLI flags with
//! environment-variable fallbacks); the engine consumes a validated
//! [`ControlVariables`] and never reads the environment itself.

pub mod defaults;
mod validation;

pub use validation::{ConfigError, ValidationWarning};

use serde::{Deserialize, Serialize};

use crate::calendar::ModelDay;

/// Analysis control variables.
///
/// Environment surface (read by the CLI, not by the library):
/// `DAYS_TO_DROP`, `DAYS_TO_PROCESS`, `NEW_DATA_DAY`, `USE_DATA_DAY`,
/// `USE_STATISTICS`, `VARIANCE_THRESHOLD`, `WEEKS_FOR_CONTROL`,
/// `WEEKS_FOR_TRENDS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlVariables {
    /// Days trimmed off the dataset's most recent date when `use_data_day`
    /// is off.
    pub days_to_drop: u32,
    /// Calendar days in the analysis window, both endpoints inclusive.
    pub days_to_process: u32,
    /// Day of week considered to have clean data (1=Sunday … 7=Saturday).
    pub new_data_day: u8,
    /// Snap the period end to the most recent `new_data_day` instead of
    /// applying `days_to_drop`.
    pub use_data_day: bool,
    /// Run the statistical out-of-control detectors.
    pub use_statistics: bool,
    /// Percentage deviation from the model before a group is flagged (0–100).
    pub variance_threshold: f64,
    /// Trailing weeks of history used to establish control limits.
    pub weeks_for_control: u32,
    /// Trailing weeks examined for trends.
    pub weeks_for_trends: u32,
}

impl Default for ControlVariables {
    fn default() -> Self {
        Self {
            days_to_drop: defaults::DEFAULT_DAYS_TO_DROP,
            days_to_process: defaults::DEFAULT_DAYS_TO_PROCESS,
            new_data_day: defaults::DEFAULT_NEW_DATA_DAY,
            use_data_day: defaults::DEFAULT_USE_DATA_DAY,
            use_statistics: defaults::DEFAULT_USE_STATISTICS,
            variance_threshold: defaults::DEFAULT_VARIANCE_THRESHOLD,
            weeks_for_control: defaults::DEFAULT_WEEKS_FOR_CONTROL,
            weeks_for_trends: defaults::DEFAULT_WEEKS_FOR_TRENDS,
        }
    }
}

impl ControlVariables {
    /// Range-check every field. Returns the first hard error; collects
    /// non-fatal warnings (suspicious but accepted values) into `warnings`.
    pub fn validate(&self, warnings: &mut Vec<ValidationWarning>) -> Result<(), ConfigError> {
        if self.days_to_process < 1 {
            return Err(ConfigError::OutOfRange {
                field: "days_to_process",
                value: self.days_to_process.to_string(),
                expected: ">= 1",
            });
        }
        if ModelDay::from_number(self.new_data_day).is_none() {
            return Err(ConfigError::OutOfRange {
                field: "new_data_day",
                value: self.new_data_day.to_string(),
                expected: "1-7 (1=Sunday)",
            });
        }
        if !(0.0..=100.0).contains(&self.variance_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "variance_threshold",
                value: self.variance_threshold.to_string(),
                expected: "0-100 (percent)",
            });
        }
        if self.weeks_for_control < 1 {
            return Err(ConfigError::OutOfRange {
                field: "weeks_for_control",
                value: self.weeks_for_control.to_string(),
                expected: ">= 1",
            });
        }
        if self.weeks_for_trends < 1 {
            return Err(ConfigError::OutOfRange {
                field: "weeks_for_trends",
                value: self.weeks_for_trends.to_string(),
                expected: ">= 1",
            });
        }

        if self.variance_threshold < 1.0 {
            warnings.push(ValidationWarning {
                field: "variance_threshold",
                message: format!(
                    "variance_threshold of {}% will flag nearly every group",
                    self.variance_threshold
                ),
            });
        }
        if self.days_to_drop > self.days_to_process {
            warnings.push(ValidationWarning {
                field: "days_to_drop",
                message: format!(
                    "days_to_drop ({}) exceeds days_to_process ({})",
                    self.days_to_drop, self.days_to_process
                ),
            });
        }
        Ok(())
    }

    /// The configured clean-data day as a typed weekday.
    ///
    /// Only meaningful after [`Self::validate`]; falls back to Sunday for an
    /// out-of-range raw value so the accessor stays total.
    pub fn new_data_day(&self) -> ModelDay {
        ModelDay::from_number(self.new_data_day).unwrap_or(ModelDay::Sunday)
    }
}
