//! System-wide default constants.
//!
//! Centralises the engine's magic numbers. Grouped by subsystem for easy
//! discovery; control-variable defaults mirror the production environment
//! surface documented on [`super::ControlVariables`].

// ============================================================================
// Statistical Control
// ============================================================================

/// P-value above which a sample is classified as normally distributed.
pub const NORMALITY_P_VALUE_THRESHOLD: f64 = 0.05;

/// Control-limit half-width in dispersion units (mean ± 3σ / median ± 3·MAD).
pub const CONTROL_LIMIT_MULTIPLIER: f64 = 3.0;

/// Minimum observations for a normality test or a statistical-variance scan.
///
/// Single source of truth; every analysis path gates on this one constant.
pub const MIN_SAMPLES_FOR_STATS: usize = 3;

/// Largest sample the Shapiro–Wilk approximation supports; bigger samples
/// are truncated to their most recent this-many observations.
pub const MAX_NORMALITY_SAMPLES: usize = 5_000;

/// Two-tailed p-value threshold for trend significance.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

// ============================================================================
// Severity Scoring
// ============================================================================

/// Severity scores are clamped to this ceiling.
pub const SEVERITY_CEILING: f64 = 100.0;

/// Hours-past-limit multiplier for statistical-variance severity.
pub const STATISTICAL_SEVERITY_SCALE: f64 = 10.0;

/// Weight of r² in trend severity: (1 − p)·100 + r²·this.
pub const TREND_R_SQUARED_WEIGHT: f64 = 20.0;

// ============================================================================
// Date Window
// ============================================================================

/// Windows longer than this are accepted with a warning.
pub const MAX_REASONABLE_WINDOW_DAYS: i64 = 365;

// ============================================================================
// Control-Variable Defaults
// ============================================================================

/// Days trimmed off the most recent date when `use_data_day` is off.
pub const DEFAULT_DAYS_TO_DROP: u32 = 7;

/// Calendar days in the analysis window, endpoints inclusive.
pub const DEFAULT_DAYS_TO_PROCESS: u32 = 84;

/// Day of week considered to have clean data (model convention, 1=Sunday).
pub const DEFAULT_NEW_DATA_DAY: u8 = 1;

/// Whether the period end snaps to the most recent `new_data_day`.
pub const DEFAULT_USE_DATA_DAY: bool = true;

/// Whether statistical out-of-control detection runs at all.
pub const DEFAULT_USE_STATISTICS: bool = true;

/// Percentage deviation from the model before a group is flagged.
pub const DEFAULT_VARIANCE_THRESHOLD: f64 = 15.0;

/// Trailing weeks of history used to establish control limits.
pub const DEFAULT_WEEKS_FOR_CONTROL: u32 = 12;

/// Trailing weeks examined for trends.
pub const DEFAULT_WEEKS_FOR_TRENDS: u32 = 8;
