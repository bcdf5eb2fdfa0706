//! Variance detection: model deviation and statistical out-of-control points.
//!
//! Three independent algorithms share the control-limit calculator:
//!
//! 1. **Model variance** — per (facility, role, day-of-week) group, compare
//!    mean actual hours against the expected-hours model.
//! 2. **Facility-role statistical variance** — per (facility, role) group,
//!    flag observations outside the group's control band.
//! 3. **Employee-role statistical variance** — the same scan per
//!    (facility, employee, role).
//!
//! Groups are materialized from ordered maps and fanned out across the rayon
//! pool; the parallel map preserves input order, so output order is
//! deterministic. A sparse or noisy group is skipped, never an error.

use chrono::Duration;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::group_by_facility_role;
use crate::calendar::ModelDay;
use crate::config::defaults::MIN_SAMPLES_FOR_STATS;
use crate::config::ControlVariables;
use crate::stats::control;
use crate::types::{
    ExpectedHoursTable, HoursSample, VarianceKind, VariancePercent, VarianceRecord,
};

/// Variance detection over one windowed snapshot.
pub struct VarianceDetector;

impl VarianceDetector {
    /// Run all three detectors and concatenate their records
    /// (model, then facility-statistical, then employee-statistical).
    pub fn detect_all(
        samples: &[HoursSample],
        model: &ExpectedHoursTable,
        vars: &ControlVariables,
    ) -> Vec<VarianceRecord> {
        let mut all = Self::model_variances(samples, model, vars);
        all.extend(Self::facility_statistical(samples, vars));
        all.extend(Self::employee_statistical(samples, vars));
        info!(total = all.len(), "variance detection complete");
        all
    }

    /// Deviation of mean actual hours from the expected-hours model,
    /// per (facility, role, day-of-week).
    ///
    /// A lookup miss counts as 0 expected hours; worked hours against a
    /// zero-hour slot are an unbounded deviation, which trips any finite
    /// threshold. Offending groups emit one record per underlying dated
    /// observation, all carrying the group-level percentage.
    pub fn model_variances(
        samples: &[HoursSample],
        model: &ExpectedHoursTable,
        vars: &ControlVariables,
    ) -> Vec<VarianceRecord> {
        if samples.is_empty() || model.is_empty() {
            debug!("no samples or empty model; skipping model variance detection");
            return Vec::new();
        }

        let mut groups: BTreeMap<(&str, &str, ModelDay), Vec<&HoursSample>> = BTreeMap::new();
        for sample in samples {
            groups
                .entry((
                    sample.facility.as_str(),
                    sample.role.as_str(),
                    ModelDay::of(sample.date),
                ))
                .or_default()
                .push(sample);
        }

        let threshold = vars.variance_threshold;
        let records: Vec<Vec<VarianceRecord>> = groups
            .into_iter()
            .collect::<Vec<_>>()
            .par_iter()
            .map(|((facility, role, day), group)| {
                let expected = model.lookup_or_zero(facility, role, *day);
                let actual_mean =
                    group.iter().map(|s| s.actual_hours).sum::<f64>() / group.len() as f64;
                let percentage = VariancePercent::from_actual_expected(actual_mean, expected);

                if !percentage.exceeds(threshold) {
                    return Vec::new();
                }
                info!(
                    facility = *facility,
                    role = *role,
                    day = %day,
                    %percentage,
                    "model variance detected"
                );

                group
                    .iter()
                    .map(|sample| VarianceRecord {
                        facility: (*facility).to_string(),
                        role: (*role).to_string(),
                        date: sample.date,
                        kind: VarianceKind::Model,
                        value: actual_mean - expected,
                        percentage: Some(percentage),
                        is_exception: true,
                        threshold_used: Some(threshold),
                        expected_hours: Some(expected),
                        actual_hours: Some(sample.actual_hours),
                        limit_violated: None,
                    })
                    .collect()
            })
            .collect();

        records.into_iter().flatten().collect()
    }

    /// Out-of-control observations per (facility, role).
    pub fn facility_statistical(
        samples: &[HoursSample],
        vars: &ControlVariables,
    ) -> Vec<VarianceRecord> {
        if !vars.use_statistics {
            info!("statistical variance detection disabled");
            return Vec::new();
        }

        let groups: Vec<_> = group_by_facility_role(samples).into_iter().collect();
        let records: Vec<Vec<VarianceRecord>> = groups
            .par_iter()
            .map(|((facility, role), group)| {
                Self::scan_group(facility, role, group, vars, false)
            })
            .collect();

        records.into_iter().flatten().collect()
    }

    /// Out-of-control observations per (facility, employee, role).
    ///
    /// Skipped entirely when statistics are disabled or no sample carries an
    /// employee identity.
    pub fn employee_statistical(
        samples: &[HoursSample],
        vars: &ControlVariables,
    ) -> Vec<VarianceRecord> {
        if !vars.use_statistics {
            info!("employee-level statistical variance detection disabled");
            return Vec::new();
        }
        if samples.iter().all(|s| s.employee_id.is_none()) {
            debug!("no employee identities in dataset; skipping employee-level detection");
            return Vec::new();
        }

        let mut groups: BTreeMap<(&str, &str, &str), Vec<&HoursSample>> = BTreeMap::new();
        for sample in samples {
            if let Some(employee_id) = sample.employee_id.as_deref() {
                groups
                    .entry((sample.facility.as_str(), employee_id, sample.role.as_str()))
                    .or_default()
                    .push(sample);
            }
        }

        let records: Vec<Vec<VarianceRecord>> = groups
            .into_iter()
            .collect::<Vec<_>>()
            .par_iter()
            .map(|((facility, employee_id, role), group)| {
                let mut found = Self::scan_group(facility, role, group, vars, true);
                if !found.is_empty() {
                    debug!(
                        facility = *facility,
                        employee_id = *employee_id,
                        role = *role,
                        violations = found.len(),
                        "employee-level statistical variances"
                    );
                }
                // Records stay keyed by facility/role; the employee identity
                // is in the observations themselves.
                for record in &mut found {
                    record.limit_violated = record
                        .limit_violated
                        .take()
                        .map(|l| format!("{l} (employee-level)"));
                }
                found
            })
            .collect();

        records.into_iter().flatten().collect()
    }

    /// Control-band scan for one group's observations.
    ///
    /// Restricts the group to the trailing `weeks_for_control` weeks of its
    /// own history before computing limits; requires the minimum sample
    /// count afterwards. `group` must be date-sorted (the engine sorts the
    /// windowed snapshot once).
    fn scan_group(
        facility: &str,
        role: &str,
        group: &[&HoursSample],
        vars: &ControlVariables,
        employee_level: bool,
    ) -> Vec<VarianceRecord> {
        let Some(latest) = group.iter().map(|s| s.date).max() else {
            return Vec::new();
        };
        let cutoff = latest - Duration::weeks(i64::from(vars.weeks_for_control));
        let recent: Vec<&HoursSample> =
            group.iter().copied().filter(|s| s.date >= cutoff).collect();

        if recent.len() < MIN_SAMPLES_FOR_STATS {
            debug!(
                facility,
                role,
                n = recent.len(),
                employee_level,
                "insufficient data for statistical variance"
            );
            return Vec::new();
        }

        let hours: Vec<f64> = recent.iter().map(|s| s.actual_hours).collect();
        let limits = control::control_limits(&hours);
        let violations = control::detect_violations(&hours, &limits);

        if !violations.is_empty() && !employee_level {
            info!(
                facility,
                role,
                violations = violations.len(),
                "statistical variances detected"
            );
        }

        violations
            .into_iter()
            .map(|violation| VarianceRecord {
                facility: facility.to_string(),
                role: role.to_string(),
                date: recent[violation.index].date,
                kind: VarianceKind::Statistical,
                value: violation.magnitude,
                percentage: None,
                is_exception: true,
                threshold_used: None,
                expected_hours: None,
                actual_hours: Some(violation.value),
                limit_violated: Some(format!("{} control limit", violation.bound.label())),
            })
            .collect()
    }
}
