//! Hours-table loader.
//!
//! Expected columns (the upstream extract's names): `LOCATION_NAME`,
//! `STAFF_ROLE_NAME`, `HOURS_DATE`, `TOTAL_HOURS`, plus optional
//! `EMPLOYEE_ID` and `EMPLOYEE_NAME`.

use std::path::Path;
use tracing::{info, warn};

use super::quality::{DataQualityEvent, QualityIssue};
use super::{parse_date, IngestError};
use crate::types::HoursSample;

const TABLE: &str = "hours";
const COL_FACILITY: &str = "LOCATION_NAME";
const COL_ROLE: &str = "STAFF_ROLE_NAME";
const COL_DATE: &str = "HOURS_DATE";
const COL_HOURS: &str = "TOTAL_HOURS";
const COL_EMPLOYEE_ID: &str = "EMPLOYEE_ID";
const COL_EMPLOYEE_NAME: &str = "EMPLOYEE_NAME";

/// Load the hours table, capturing per-row problems as quality events.
pub fn load_hours_csv(
    path: &Path,
) -> Result<(Vec<HoursSample>, Vec<DataQualityEvent>), IngestError> {
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
    let date_idx = col(COL_DATE)?;
    let hours_idx = col(COL_HOURS)?;
    let employee_id_idx = headers.iter().position(|h| h == COL_EMPLOYEE_ID);
    let employee_name_idx = headers.iter().position(|h| h == COL_EMPLOYEE_NAME);

    let mut samples = Vec::new();
    let mut events = Vec::new();

    for (row_number, record) in reader.records().enumerate() {
        let row = row_number + 1;
        let record = record?;
        let get = |idx: usize| record.get(idx).unwrap_or("").trim();

        let facility = get(facility_idx);
        let role = get(role_idx);
        let context = |field: &str, raw: &str, issue: QualityIssue| DataQualityEvent {
            row,
            facility: (!facility.is_empty()).then(|| facility.to_string()),
            role: (!role.is_empty()).then(|| role.to_string()),
            field: field.to_string(),
            raw_value: raw.to_string(),
            issue,
        };

        if facility.is_empty() {
            events.push(context(COL_FACILITY, "", QualityIssue::MissingValue));
            continue;
        }
        if role.is_empty() {
            events.push(context(COL_ROLE, "", QualityIssue::MissingValue));
            continue;
        }

        let raw_date = get(date_idx);
        let Some(date) = parse_date(raw_date) else {
            events.push(context(
                COL_DATE,
                raw_date,
                if raw_date.is_empty() {
                    QualityIssue::MissingValue
                } else {
                    QualityIssue::InvalidDate
                },
            ));
            continue;
        };

        let raw_hours = get(hours_idx);
        let Ok(actual_hours) = raw_hours.parse::<f64>() else {
            events.push(context(
                COL_HOURS,
                raw_hours,
                if raw_hours.is_empty() {
                    QualityIssue::MissingValue
                } else {
                    QualityIssue::InvalidHours
                },
            ));
            continue;
        };
        if !actual_hours.is_finite() {
            events.push(context(COL_HOURS, raw_hours, QualityIssue::InvalidHours));
            continue;
        }
        if actual_hours < 0.0 {
            events.push(context(COL_HOURS, raw_hours, QualityIssue::NegativeHours));
            continue;
        }

        let optional = |idx: Option<usize>| {
            idx.map(|i| get(i))
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };

        samples.push(HoursSample {
            facility: facility.to_string(),
            role: role.to_string(),
            date,
            actual_hours,
            employee_id: optional(employee_id_idx),
            employee_name: optional(employee_name_idx),
        });
    }

    if events.is_empty() {
        info!(rows = samples.len(), "hours table loaded");
    } else {
        warn!(
            rows = samples.len(),
            quality_events = events.len(),
            "hours table loaded with data-quality problems"
        );
    }
    Ok((samples, events))
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
    fn loads_well_formed_rows() {
        let file = write_csv(
            "LOCATION_NAME,STAFF_ROLE_NAME,HOURS_DATE,TOTAL_HOURS,EMPLOYEE_ID,EMPLOYEE_NAME\n\
             North,RN,2025-05-01,8.5,E1,Avery Lee\n\
             North,Aide,05/02/2025,6.0,,\n",
        );
        let (samples, events) = load_hours_csv(file.path()).unwrap();

        assert_eq!(samples.len(), 2);
        assert!(events.is_empty());
        assert_eq!(samples[0].employee_id.as_deref(), Some("E1"));
        assert_eq!(samples[1].employee_id, None);
        assert_eq!(samples[1].date, chrono::NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
    }

    #[test]
    fn bad_rows_become_quality_events() {
        let file = write_csv(
            "LOCATION_NAME,STAFF_ROLE_NAME,HOURS_DATE,TOTAL_HOURS\n\
             North,RN,2025-05-01,8.5\n\
             North,RN,not-a-date,8.0\n\
             North,RN,2025-05-03,lots\n\
             North,RN,2025-05-04,-4.0\n\
             ,RN,2025-05-05,8.0\n",
        );
        let (samples, events) = load_hours_csv(file.path()).unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].issue, QualityIssue::InvalidDate);
        assert_eq!(events[1].issue, QualityIssue::InvalidHours);
        assert_eq!(events[2].issue, QualityIssue::NegativeHours);
        assert_eq!(events[3].issue, QualityIssue::MissingValue);
        assert_eq!(events[0].row, 2);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let file = write_csv("LOCATION_NAME,STAFF_ROLE_NAME,HOURS_DATE\nNorth,RN,2025-05-01\n");
        let result = load_hours_csv(file.path());
        assert!(matches!(
            result,
            Err(IngestError::MissingColumn {
                column: "TOTAL_HOURS",
                ..
            })
        ));
    }

    #[test]
    fn employee_columns_are_optional() {
        let file = write_csv(
            "LOCATION_NAME,STAFF_ROLE_NAME,HOURS_DATE,TOTAL_HOURS\nNorth,RN,2025-05-01,8.0\n",
        );
        let (samples, events) = load_hours_csv(file.path()).unwrap();
        assert_eq!(samples.len(), 1);
        assert!(events.is_empty());
        assert_eq!(samples[0].employee_id, None);
    }
}
