//! Trailing-window trend analysis per (facility, role).
//!
//! Observations inside the trailing `weeks_for_trends` window are bucketed
//! into Sunday-started weeks, averaged, and fitted with OLS against the
//! day-offset from the window's first observation. The significance gate
//! comes first: an insignificant fit is "stable" no matter the slope sign.

use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use tracing::debug;

use super::group_by_facility_role;
use crate::calendar::week_start;
use crate::config::defaults::{MIN_SAMPLES_FOR_STATS, SIGNIFICANCE_THRESHOLD};
use crate::config::ControlVariables;
use crate::stats::regression;
use crate::types::{HoursSample, TrendDirection, TrendRecord};

/// Trend analysis over one windowed snapshot.
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    /// Fit a trend for every (facility, role) with enough trailing data.
    ///
    /// Groups with fewer than three weekly points after aggregation are
    /// silently skipped.
    pub fn analyze_all(samples: &[HoursSample], vars: &ControlVariables) -> Vec<TrendRecord> {
        let groups: Vec<_> = group_by_facility_role(samples).into_iter().collect();
        groups
            .par_iter()
            .filter_map(|((facility, role), group)| {
                Self::analyze_group(facility, role, group, vars.weeks_for_trends)
            })
            .collect()
    }

    /// Trend fit for one group. `group` must be date-sorted.
    fn analyze_group(
        facility: &str,
        role: &str,
        group: &[&HoursSample],
        weeks_for_trends: u32,
    ) -> Option<TrendRecord> {
        let latest = group.iter().map(|s| s.date).max()?;
        let cutoff = latest - Duration::weeks(i64::from(weeks_for_trends));
        let window: Vec<&HoursSample> =
            group.iter().copied().filter(|s| s.date >= cutoff).collect();

        let window_start = window.iter().map(|s| s.date).min()?;
        let window_end = window.iter().map(|s| s.date).max()?;

        // Weekly aggregation to damp day-of-week noise: mean hours per
        // Sunday-started week, positioned at the week's earliest observation.
        let mut weeks: std::collections::BTreeMap<NaiveDate, (f64, usize, NaiveDate)> =
            std::collections::BTreeMap::new();
        for sample in &window {
            let bucket = weeks
                .entry(week_start(sample.date))
                .or_insert((0.0, 0, sample.date));
            bucket.0 += sample.actual_hours;
            bucket.1 += 1;
            bucket.2 = bucket.2.min(sample.date);
        }

        if weeks.len() < MIN_SAMPLES_FOR_STATS {
            debug!(
                facility,
                role,
                weekly_points = weeks.len(),
                "insufficient trend data"
            );
            return None;
        }

        let mut x = Vec::with_capacity(weeks.len());
        let mut y = Vec::with_capacity(weeks.len());
        for (sum, count, first_date) in weeks.values() {
            x.push((*first_date - window_start).num_days() as f64);
            y.push(sum / *count as f64);
        }

        let fit = regression::linear_trend(&x, &y);
        let is_significant = fit.p_value <= SIGNIFICANCE_THRESHOLD;
        let direction = if !is_significant {
            TrendDirection::Stable
        } else if fit.slope > 0.0 {
            TrendDirection::Increasing
        } else if fit.slope < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        debug!(
            facility,
            role,
            slope = fit.slope,
            p_value = fit.p_value,
            %direction,
            "trend analysis"
        );

        Some(TrendRecord {
            facility: facility.to_string(),
            role: role.to_string(),
            window_start,
            window_end,
            slope: fit.slope,
            p_value: fit.p_value,
            r_squared: fit.r_squared,
            is_significant,
            direction,
            weeks_analyzed: weeks_for_trends,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(facility: &str, role: &str, d: NaiveDate, hours: f64) -> HoursSample {
        HoursSample {
            facility: facility.to_string(),
            role: role.to_string(),
            date: d,
            actual_hours: hours,
            employee_id: None,
            employee_name: None,
        }
    }

    /// Daily samples over `days` days ending 2025-05-25, hours from a closure.
    fn daily_series(facility: &str, role: &str, days: i64, hours: impl Fn(i64) -> f64) -> Vec<HoursSample> {
        let end = date(2025, 5, 25);
        (0..days)
            .map(|i| {
                let d = end - Duration::days(days - 1 - i);
                sample(facility, role, d, hours(i))
            })
            .collect()
    }

    #[test]
    fn flat_series_is_stable_and_insignificant() {
        let samples = daily_series("North", "RN", 56, |_| 40.0);
        let vars = ControlVariables::default();

        let trends = TrendAnalyzer::analyze_all(&samples, &vars);
        assert_eq!(trends.len(), 1);
        let trend = &trends[0];
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert!(!trend.is_significant);
        assert!(trend.slope.abs() < f64::EPSILON);
    }

    #[test]
    fn steady_growth_is_increasing() {
        let samples = daily_series("North", "RN", 56, |i| 30.0 + 0.5 * i as f64);
        let vars = ControlVariables::default();

        let trends = TrendAnalyzer::analyze_all(&samples, &vars);
        assert_eq!(trends.len(), 1);
        let trend = &trends[0];
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert!(trend.is_significant);
        assert!(trend.slope > 0.0);
        assert!(trend.r_squared > 0.9);
    }

    #[test]
    fn steady_decline_is_decreasing() {
        let samples = daily_series("North", "RN", 56, |i| 60.0 - 0.5 * i as f64);
        let vars = ControlVariables::default();

        let trends = TrendAnalyzer::analyze_all(&samples, &vars);
        assert_eq!(trends[0].direction, TrendDirection::Decreasing);
        assert!(trends[0].is_significant);
    }

    #[test]
    fn too_few_weekly_points_skips_group() {
        // Nine days spans at most three Sunday-weeks, but give it two.
        let samples = daily_series("North", "RN", 8, |_| 40.0);
        let vars = ControlVariables::default();

        // 8 days ending Sunday 2025-05-25: buckets are the weeks of
        // 2025-05-11 (one day), 2025-05-18 (seven days)... keep the check
        // honest by using 3 days only.
        let short = daily_series("South", "RN", 3, |_| 40.0);
        let mut all = samples;
        all.extend(short);
        all.sort_by(|a, b| a.date.cmp(&b.date));

        let trends = TrendAnalyzer::analyze_all(&all, &vars);
        // "South" spans 2025-05-23..25: two week buckets at most — skipped.
        assert!(trends.iter().all(|t| t.facility != "South"));
    }

    #[test]
    fn trailing_window_excludes_old_history() {
        // Strong old decline outside the window, flat recent data: stable.
        let end = date(2025, 5, 25);
        let mut samples = Vec::new();
        // Old: 30 days of steep decline ending 20 weeks before the end.
        for i in 0..30i64 {
            let d = end - Duration::weeks(20) - Duration::days(30 - i);
            samples.push(sample("North", "RN", d, 200.0 - 5.0 * i as f64));
        }
        // Recent: 8 weeks of flat hours.
        for i in 0..56i64 {
            let d = end - Duration::days(55 - i);
            samples.push(sample("North", "RN", d, 40.0));
        }
        samples.sort_by(|a, b| a.date.cmp(&b.date));
        let vars = ControlVariables::default(); // weeks_for_trends = 8

        let trends = TrendAnalyzer::analyze_all(&samples, &vars);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Stable);
        assert!(trends[0].window_start >= end - Duration::weeks(8));
    }

    #[test]
    fn records_carry_window_bounds_and_weeks() {
        let samples = daily_series("North", "RN", 56, |i| 30.0 + 0.5 * i as f64);
        let vars = ControlVariables::default();

        let trend = &TrendAnalyzer::analyze_all(&samples, &vars)[0];
        assert_eq!(trend.weeks_analyzed, vars.weeks_for_trends);
        assert_eq!(trend.window_end, date(2025, 5, 25));
        assert!(trend.window_start < trend.window_end);
    }
}
