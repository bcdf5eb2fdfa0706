//! ShiftWatch - Workforce Staffing Operational Intelligence
//!
//! Loads an hours extract and an expected-hours model, runs one batch
//! analysis, prints a summary, and optionally writes the full report as
//! JSON for downstream reporting.
//!
//! # Usage
//!
//! ```bash
//! shiftwatch --hours FacilityHours.csv --model ModelHours.csv
//!
//! # Explicit window (testing / manual reruns)
//! shiftwatch --hours h.csv --model m.csv \
//!     --start-date 2025-03-02 --end-date 2025-05-24
//!
//! # Full report as JSON
//! shiftwatch --hours h.csv --model m.csv --output report.json
//! ```
//!
//! # Environment Variables
//!
//! Every control variable can come from the environment instead of a flag:
//! `DAYS_TO_DROP`, `DAYS_TO_PROCESS`, `NEW_DATA_DAY`, `USE_DATA_DAY`,
//! `USE_STATISTICS`, `VARIANCE_THRESHOLD`, `WEEKS_FOR_CONTROL`,
//! `WEEKS_FOR_TRENDS`. `RUST_LOG` controls logging (default: info).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use shiftwatch::{config::defaults, ControlVariables, WindowOverride};

#[derive(Parser, Debug)]
#[command(name = "shiftwatch")]
#[command(about = "Workforce staffing variance and exception analysis")]
#[command(version)]
struct CliArgs {
    /// Path to the facility hours CSV
    #[arg(long)]
    hours: PathBuf,

    /// Path to the expected-hours model CSV
    #[arg(long)]
    model: PathBuf,

    /// Explicit analysis start date (requires --end-date)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Explicit analysis end date (requires --start-date)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Write the full analysis report as JSON
    #[arg(long)]
    output: Option<PathBuf>,

    /// Days trimmed off the most recent date when data-day snapping is off
    #[arg(long, env = "DAYS_TO_DROP", default_value_t = defaults::DEFAULT_DAYS_TO_DROP)]
    days_to_drop: u32,

    /// Calendar days in the analysis window (endpoints inclusive)
    #[arg(long, env = "DAYS_TO_PROCESS", default_value_t = defaults::DEFAULT_DAYS_TO_PROCESS)]
    days_to_process: u32,

    /// Day of week with clean data, 1=Sunday .. 7=Saturday
    #[arg(long, env = "NEW_DATA_DAY", default_value_t = defaults::DEFAULT_NEW_DATA_DAY)]
    new_data_day: u8,

    /// Snap the period end to the most recent clean-data day (true/false)
    #[arg(
        long,
        env = "USE_DATA_DAY",
        default_value_t = defaults::DEFAULT_USE_DATA_DAY,
        action = clap::ArgAction::Set
    )]
    use_data_day: bool,

    /// Run statistical out-of-control detection (true/false)
    #[arg(
        long,
        env = "USE_STATISTICS",
        default_value_t = defaults::DEFAULT_USE_STATISTICS,
        action = clap::ArgAction::Set
    )]
    use_statistics: bool,

    /// Percent deviation from the model before a group is flagged
    #[arg(long, env = "VARIANCE_THRESHOLD", default_value_t = defaults::DEFAULT_VARIANCE_THRESHOLD)]
    variance_threshold: f64,

    /// Trailing weeks of history for control limits
    #[arg(long, env = "WEEKS_FOR_CONTROL", default_value_t = defaults::DEFAULT_WEEKS_FOR_CONTROL)]
    weeks_for_control: u32,

    /// Trailing weeks examined for trends
    #[arg(long, env = "WEEKS_FOR_TRENDS", default_value_t = defaults::DEFAULT_WEEKS_FOR_TRENDS)]
    weeks_for_trends: u32,
}

impl CliArgs {
    fn control_variables(&self) -> ControlVariables {
        ControlVariables {
            days_to_drop: self.days_to_drop,
            days_to_process: self.days_to_process,
            new_data_day: self.new_data_day,
            use_data_day: self.use_data_day,
            use_statistics: self.use_statistics,
            variance_threshold: self.variance_threshold,
            weeks_for_control: self.weeks_for_control,
            weeks_for_trends: self.weeks_for_trends,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let vars = args.control_variables();

    info!(
        days_to_drop = vars.days_to_drop,
        days_to_process = vars.days_to_process,
        new_data_day = vars.new_data_day,
        use_data_day = vars.use_data_day,
        use_statistics = vars.use_statistics,
        variance_threshold = vars.variance_threshold,
        "control variables"
    );

    let (samples, hours_quality) = shiftwatch::load_hours_csv(&args.hours)
        .with_context(|| format!("loading hours table from {}", args.hours.display()))?;
    let (model, model_quality) = shiftwatch::load_model_csv(&args.model)
        .with_context(|| format!("loading model table from {}", args.model.display()))?;

    let quality_events = hours_quality.len() + model_quality.len();
    if quality_events > 0 {
        warn!(count = quality_events, "data-quality events captured during ingestion");
        for event in hours_quality.iter().chain(model_quality.iter()) {
            warn!(table = "ingestion", "{event}");
        }
    }

    let report = shiftwatch::run(
        &samples,
        &model,
        &vars,
        WindowOverride {
            start: args.start_date,
            end: args.end_date,
        },
    )
    .context("analysis run failed")?;

    print_summary(&report);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}

fn print_summary(report: &shiftwatch::AnalysisReport) {
    println!();
    println!("Analysis window: {} to {} ({} days)", report.window.start, report.window.end, report.window.span_days());
    println!(
        "Groups analyzed: {}   Trends fitted: {}   Exceptions: {}",
        report.summaries.len(),
        report.trends.len(),
        report.exceptions.len()
    );

    if report.exceptions.is_empty() {
        println!("No staffing exceptions detected.");
        return;
    }

    println!();
    println!(
        "{:<24} {:<20} {:<12} {:>8}  {}",
        "Facility", "Role", "Date", "Severity", "Description"
    );
    println!("{}", "-".repeat(100));
    for exception in report.exceptions.iter().take(25) {
        println!(
            "{:<24} {:<20} {:<12} {:>8.1}  {}",
            exception.facility,
            exception.role,
            exception.date.to_string(),
            exception.severity,
            exception.description
        );
    }
    if report.exceptions.len() > 25 {
        println!("... and {} more", report.exceptions.len() - 25);
    }
}
