//! Habit-day calendar.
//!
//! A "habit day" is a 24-hour accounting period that starts at a
//! configurable reset hour instead of midnight, so a session logged at
//! 01:30 with a 03:00 boundary still counts toward the previous day.
//! Every component that compares date keys routes through
//! [`HabitCalendar::habit_day`]; duplicating the boundary logic anywhere
//! else is a correctness bug.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default reset hour: a day "ends" at 03:00 local time.
pub const DEFAULT_BOUNDARY_HOUR: u32 = 3;

/// Maps wall-clock timestamps to habit-day keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCalendar {
    /// Local hour (0-23) at which a new habit day begins.
    boundary_hour: u32,
    /// Offset in hours from UTC used to read the "local" clock.
    timezone_offset_hours: i32,
}

impl HabitCalendar {
    /// Create a calendar with the given reset hour and timezone offset.
    ///
    /// # Errors
    /// Rejects `boundary_hour >= 24` and offsets outside UTC-12..=UTC+14.
    pub fn new(boundary_hour: u32, timezone_offset_hours: i32) -> Result<Self, ValidationError> {
        if boundary_hour >= 24 {
            return Err(ValidationError::InvalidValue {
                field: "boundary_hour".to_string(),
                message: format!("must be in 0..24, got {boundary_hour}"),
            });
        }
        if !(-12..=14).contains(&timezone_offset_hours) {
            return Err(ValidationError::InvalidValue {
                field: "timezone_offset_hours".to_string(),
                message: format!("must be in -12..=14, got {timezone_offset_hours}"),
            });
        }
        Ok(Self {
            boundary_hour,
            timezone_offset_hours,
        })
    }

    /// The reset hour this calendar was built with.
    pub fn boundary_hour(&self) -> u32 {
        self.boundary_hour
    }

    /// Map a timestamp to its habit-day key.
    ///
    /// Returns the local calendar date of `at` when the local hour is at
    /// or past the boundary hour, otherwise the previous calendar date.
    /// Pure: same input, same key, no clock reads.
    pub fn habit_day(&self, at: DateTime<Utc>) -> NaiveDate {
        let offset = FixedOffset::east_opt(self.timezone_offset_hours * 3600)
            .unwrap_or(FixedOffset::east_opt(0).unwrap());
        let local = at.with_timezone(&offset);
        let date = local.date_naive();

        if local.hour() < self.boundary_hour {
            // Late-night activity belongs to the prior day.
            date.checked_sub_days(Days::new(1)).unwrap_or(date)
        } else {
            date
        }
    }

    /// The habit day currently in progress, as of `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.habit_day(now)
    }
}

impl Default for HabitCalendar {
    fn default() -> Self {
        Self {
            boundary_hour: DEFAULT_BOUNDARY_HOUR,
            timezone_offset_hours: 0,
        }
    }
}
