//! Weekday-convention conversion.
//!
//! Two day-numbering conventions meet in this system:
//!
//! - **Model convention**: Sunday=1 … Saturday=7, used by the expected-hours
//!   model tables and the `new_data_day` control variable.
//! - **chrono's `Weekday`**: Monday-first, used everywhere a date is handled.
//!
//! All conversion knowledge lives here as total functions on the [`ModelDay`]
//! enum. No other module is allowed to do weekday arithmetic.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Day of week in the model-table convention (Sunday=1 … Saturday=7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModelDay {
    Sunday = 1,
    Monday = 2,
    Tuesday = 3,
    Wednesday = 4,
    Thursday = 5,
    Friday = 6,
    Saturday = 7,
}

impl ModelDay {
    /// Parse a model-convention day number (1–7). Returns `None` outside the range.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Sunday),
            2 => Some(Self::Monday),
            3 => Some(Self::Tuesday),
            4 => Some(Self::Wednesday),
            5 => Some(Self::Thursday),
            6 => Some(Self::Friday),
            7 => Some(Self::Saturday),
            _ => None,
        }
    }

    /// The model-convention number (1=Sunday … 7=Saturday).
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Convert to chrono's Monday-first weekday.
    pub fn to_weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
            Self::Tuesday => Weekday::Tue,
            Self::Wednesday => Weekday::Wed,
            Self::Thursday => Weekday::Thu,
            Self::Friday => Weekday::Fri,
            Self::Saturday => Weekday::Sat,
        }
    }

    /// Convert from chrono's Monday-first weekday.
    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sun => Self::Sunday,
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
        }
    }

    /// The model-convention day for a calendar date.
    pub fn of(date: NaiveDate) -> Self {
        Self::from_weekday(date.weekday())
    }

    /// English day name, e.g. "Sunday".
    pub fn name(self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }
}

impl std::fmt::Display for ModelDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The Sunday that starts the week containing `date`.
///
/// Week buckets are Sunday-started, consistent with the model convention.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_sunday = i64::from(date.weekday().num_days_from_sunday());
    date - chrono::Duration::days(days_since_sunday)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_number_covers_all_seven_days() {
        let expected = [
            (1, ModelDay::Sunday),
            (2, ModelDay::Monday),
            (3, ModelDay::Tuesday),
            (4, ModelDay::Wednesday),
            (5, ModelDay::Thursday),
            (6, ModelDay::Friday),
            (7, ModelDay::Saturday),
        ];
        for (n, day) in expected {
            assert_eq!(ModelDay::from_number(n), Some(day));
            assert_eq!(day.number(), n);
        }
        assert_eq!(ModelDay::from_number(0), None);
        assert_eq!(ModelDay::from_number(8), None);
    }

    #[test]
    fn weekday_round_trip_all_seven_days() {
        for n in 1..=7u8 {
            let day = ModelDay::from_number(n).unwrap();
            assert_eq!(ModelDay::from_weekday(day.to_weekday()), day);
        }
    }

    #[test]
    fn chrono_mapping_matches_convention() {
        // 2025-05-25 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2025, 5, 25).unwrap();
        assert_eq!(ModelDay::of(sunday), ModelDay::Sunday);
        assert_eq!(ModelDay::of(sunday).number(), 1);

        // Walk the full week that follows
        for offset in 0..7i64 {
            let date = sunday + chrono::Duration::days(offset);
            let expected = u8::try_from(offset).unwrap() + 1;
            assert_eq!(ModelDay::of(date).number(), expected);
        }
    }

    #[test]
    fn week_start_is_the_containing_sunday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 5, 25).unwrap();
        for offset in 0..7i64 {
            let date = sunday + chrono::Duration::days(offset);
            assert_eq!(week_start(date), sunday);
        }
        // The next Sunday starts a new week
        let next_sunday = sunday + chrono::Duration::days(7);
        assert_eq!(week_start(next_sunday), next_sunday);
    }

    #[test]
    fn display_uses_day_names() {
        assert_eq!(ModelDay::Sunday.to_string(), "Sunday");
        assert_eq!(ModelDay::Saturday.to_string(), "Saturday");
    }
}
