//! Hours records and the expected-hours model table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::calendar::ModelDay;

/// One recorded observation of worked hours.
///
/// Immutable once loaded; the engine only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursSample {
    /// Facility name (grouping key).
    pub facility: String,
    /// Staff role name (grouping key).
    pub role: String,
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Actual hours worked (never negative; enforced at ingestion).
    pub actual_hours: f64,
    /// Employee identifier, when the feed carries one.
    pub employee_id: Option<String>,
    /// Employee display name, when the feed carries one.
    pub employee_name: Option<String>,
}

/// Expected hours for one (facility, role, day-of-week) slot.
///
/// Model tables arrive in two shapes: a direct per-day aggregate, or a
/// per-person daily rate with a budgeted staff count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExpectedHours {
    /// Total expected hours for the whole role on that day.
    Aggregate(f64),
    /// Per-person daily hours multiplied by budgeted headcount.
    PerPerson { rate: f64, staff_count: f64 },
}

impl ExpectedHours {
    /// Total expected hours for the slot, whichever shape the model uses.
    pub fn total(self) -> f64 {
        match self {
            Self::Aggregate(hours) => hours,
            Self::PerPerson { rate, staff_count } => rate * staff_count,
        }
    }
}

/// Composite lookup key for the expected-hours model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelKey {
    pub facility: String,
    pub role: String,
    pub day: ModelDay,
}

/// One row of the expected-hours model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedHoursEntry {
    pub facility: String,
    pub role: String,
    pub day: ModelDay,
    pub expected: ExpectedHours,
}

/// The expected-hours model, keyed by (facility, role, day-of-week).
///
/// Ordered map so iteration (and everything derived from it) is
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedHoursTable {
    entries: BTreeMap<ModelKey, ExpectedHours>,
}

impl ExpectedHoursTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from entries. Later duplicates of a key replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = ExpectedHoursEntry>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry);
        }
        table
    }

    pub fn insert(&mut self, entry: ExpectedHoursEntry) {
        self.entries.insert(
            ModelKey {
                facility: entry.facility,
                role: entry.role,
                day: entry.day,
            },
            entry.expected,
        );
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Expected hours for an exact (facility, role, day) slot.
    pub fn lookup(&self, facility: &str, role: &str, day: ModelDay) -> Option<f64> {
        // BTreeMap<ModelKey, _> can't be probed with borrowed fields, so key
        // lookups clone the two strings. Model tables are small; fine.
        let key = ModelKey {
            facility: facility.to_string(),
            role: role.to_string(),
            day,
        };
        self.entries.get(&key).map(|e| e.total())
    }

    /// Expected hours for a slot, treating a lookup miss as 0 expected hours.
    ///
    /// A miss is the "no budget for this combination" case, which downstream
    /// becomes the unbounded-variance rule when actual hours exist.
    pub fn lookup_or_zero(&self, facility: &str, role: &str, day: ModelDay) -> f64 {
        self.lookup(facility, role, day).unwrap_or_else(|| {
            debug!(facility, role, day = %day, "no expected-hours entry; treating as 0");
            0.0
        })
    }
}
