//! Expected-hours model loader.
//!
//! Two formats share the key columns `LOCATION_NAME`, `STAFF_ROLE_NAME`,
//! `DAY_NUMBER` (1=Sunday … 7=Saturday):
//!
//! - legacy: a `TOTAL_HOURS` aggregate per slot;
//! - current: `DAILY_HOURS_PER_ROLE` plus `STAFF_COUNT`.
//!
//! When both per-person columns are present they win; otherwise the loader
//! falls back to the aggregate column.

use std::path::Path;
use tracing::{info, warn};

use super::quality::{DataQualityEvent, QualityIssue};
use super::IngestError;
use crate::calendar::ModelDay;
use crate::types::{ExpectedHours, ExpectedHoursEntry, ExpectedHoursTable};

const TABLE: &str = "model";
const COL_FACILITY: &str = "LOCATION_NAME";
const COL_ROLE: &str = "STAFF_ROLE_NAME";
const COL_DAY_NUMBER: &str = "DAY_NUMBER";
const COL_TOTAL_HOURS: &str = "TOTAL_HOURS";
const COL_RATE: &str = "DAILY_HOURS_PER_ROLE";
const COL_STAFF_COUNT: &str = "STAFF_COUNT";

/// Load the expected-hours model table.
pub fn load_model_csv(
    path: &Path,
) -> Result<(ExpectedHoursTable, Vec<DataQualityEvent>), IngestError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let col = |name: &'static str| -> Result<usize, IngestError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(IngestError::MissingColumn {
                table: TABLE,
                column: name,
            })
    };
    let facility_idx = col(COL_FACILITY)?;
    let role_idx = col(COL_ROLE)?;
    let day_idx = col(COL_DAY_NUMBER)?;

    let rate_idx = headers.iter().position(|h| h == COL_RATE);
    let staff_idx = headers.iter().position(|h| h == COL_STAFF_COUNT);
    let per_person = match (rate_idx, staff_idx) {
        (Some(rate), Some(staff)) => Some((rate, staff)),
        _ => None,
    };
    // The aggregate column is only required when the per-person pair is absent.
    let total_idx = if per_person.is_none() {
        Some(col(COL_TOTAL_HOURS)?)
    } else {
        headers.iter().position(|h| h == COL_TOTAL_HOURS)
    };

    let mut table = ExpectedHoursTable::new();
    let mut events = Vec::new();

    for (row_number, record) in reader.records().enumerate() {
        let row = row_number + 1;
        let record = record?;
        let get = |idx: usize| record.get(idx).unwrap_or("").trim();

        let facility = get(facility_idx);
        let role = get(role_idx);
        let event = |field: &str, raw: &str, issue: QualityIssue| DataQualityEvent {
            row,
            facility: (!facility.is_empty()).then(|| facility.to_string()),
            role: (!role.is_empty()).then(|| role.to_string()),
            field: field.to_string(),
            raw_value: raw.to_string(),
            issue,
        };

        if facility.is_empty() {
            events.push(event(COL_FACILITY, "", QualityIssue::MissingValue));
            continue;
        }
        if role.is_empty() {
            events.push(event(COL_ROLE, "", QualityIssue::MissingValue));
            continue;
        }

        let raw_day = get(day_idx);
        let day = raw_day
            .parse::<u8>()
            .ok()
            .and_then(ModelDay::from_number);
        let Some(day) = day else {
            events.push(event(COL_DAY_NUMBER, raw_day, QualityIssue::InvalidDayNumber));
            continue;
        };

        let parse_hours = |idx: usize,
                           field: &'static str,
                           events: &mut Vec<DataQualityEvent>|
         -> Option<f64> {
            let raw = get(idx);
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
                Ok(v) if v < 0.0 => {
                    events.push(event(field, raw, QualityIssue::NegativeHours));
                    None
                }
                Ok(_) => {
                    events.push(event(field, raw, QualityIssue::InvalidHours));
                    None
                }
                Err(_) => {
                    events.push(event(
                        field,
                        raw,
                        if raw.is_empty() {
                            QualityIssue::MissingValue
                        } else {
                            QualityIssue::InvalidHours
                        },
                    ));
                    None
                }
            }
        };

        let expected = if let Some((rate_idx, staff_idx)) = per_person {
            let Some(rate) = parse_hours(rate_idx, COL_RATE, &mut events) else {
                continue;
            };
            let Some(staff_count) = parse_hours(staff_idx, COL_STAFF_COUNT, &mut events) else {
                continue;
            };
            ExpectedHours::PerPerson { rate, staff_count }
        } else {
            // total_idx is always Some on this branch.
            let Some(idx) = total_idx else { continue };
            let Some(hours) = parse_hours(idx, COL_TOTAL_HOURS, &mut events) else {
                continue;
            };
            ExpectedHours::Aggregate(hours)
        };

        table.insert(ExpectedHoursEntry {
            facility: facility.to_string(),
            role: role.to_string(),
            day,
            expected,
        });
    }

    if events.is_empty() {
        info!(entries = table.len(), "model table loaded");
    } else {
        warn!(
            entries = table.len(),
            quality_events = events.len(),
            "model table loaded with data-quality problems"
        );
    }
    Ok((table, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_legacy_aggregate_format() {
        let file = write_csv(
            "LOCATION_NAME,STAFF_ROLE_NAME,DAY_NUMBER,TOTAL_HOURS\n\
             North,RN,1,36.0\n\
             North,RN,2,40.0\n",
        );
        let (table, events) = load_model_csv(file.path()).unwrap();
        assert!(events.is_empty());
        assert_eq!(table.lookup("North", "RN", ModelDay::Sunday), Some(36.0));
        assert_eq!(table.lookup("North", "RN", ModelDay::Monday), Some(40.0));
    }

    #[test]
    fn per_person_format_wins_when_present() {
        let file = write_csv(
            "LOCATION_NAME,STAFF_ROLE_NAME,DAY_NUMBER,TOTAL_HOURS,DAILY_HOURS_PER_ROLE,STAFF_COUNT\n\
             North,RN,2,999.0,12.0,3\n",
        );
        let (table, _) = load_model_csv(file.path()).unwrap();
        assert_eq!(table.lookup("North", "RN", ModelDay::Monday), Some(36.0));
    }

    #[test]
    fn invalid_day_number_becomes_event() {
        let file = write_csv(
            "LOCATION_NAME,STAFF_ROLE_NAME,DAY_NUMBER,TOTAL_HOURS\n\
             North,RN,8,36.0\n\
             North,RN,zero,36.0\n",
        );
        let (table, events) = load_model_csv(file.path()).unwrap();
        assert!(table.is_empty());
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| e.issue == QualityIssue::InvalidDayNumber));
    }

    #[test]
    fn missing_key_columns_are_fatal() {
        let file = write_csv("LOCATION_NAME,TOTAL_HOURS\nNorth,36.0\n");
        assert!(matches!(
            load_model_csv(file.path()),
            Err(IngestError::MissingColumn { .. })
        ));
    }
}
