//! Activity session records.
//!
//! Sessions are immutable once recorded. The store collaborator may hand
//! back partial records (a day key without a timestamp, or vice versa);
//! a record carrying neither is unusable and gets skipped by the
//! calculators rather than failing the whole computation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::HabitCalendar;

/// A single logged activity session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier assigned at creation.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// How long the session actually ran.
    pub duration_seconds: u32,

    /// The duration goal this session was logged against.
    #[serde(default)]
    pub target_seconds: u32,

    /// When the session happened.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,

    /// Explicit day key supplied by the store. Takes precedence over
    /// derivation from `occurred_at`.
    #[serde(default)]
    pub habit_day: Option<NaiveDate>,
}

impl Session {
    /// Create a session for a timestamp; the day key stays derived.
    pub fn new(duration_seconds: u32, target_seconds: u32, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            duration_seconds,
            target_seconds,
            occurred_at: Some(occurred_at),
            habit_day: None,
        }
    }

    /// The habit day this session counts toward, or `None` when the
    /// record carries neither a day key nor a timestamp.
    pub fn day(&self, calendar: &HabitCalendar) -> Option<NaiveDate> {
        self.habit_day
            .or_else(|| self.occurred_at.map(|at| calendar.habit_day(at)))
    }

    /// Whether this session met or exceeded its own duration goal.
    pub fn met_target(&self) -> bool {
        self.target_seconds > 0 && self.duration_seconds >= self.target_seconds
    }
}
