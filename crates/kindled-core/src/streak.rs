//! Consecutive habit-day streak calculation.
//!
//! A day is "successful" when it collects at least `daily_target`
//! sessions. The current streak is the run of successful days ending at
//! today's habit day, with one wrinkle: the still-open current day gets a
//! grace period, so an incomplete "today" is skipped rather than counted
//! or broken. History reconstruction scans a bounded window and returns
//! every maximal run as a [`StreakPeriod`].

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::HabitCalendar;
use crate::error::ValidationError;
use crate::session::Session;

/// Default history reconstruction window.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Snapshot of a user's streak state. Replaced wholesale on every
/// recomputation, never mutated field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    /// Consecutive successful habit days ending at today (grace-aware).
    pub current_streak: u32,
    /// Longest run observed inside the lookback window.
    pub longest_streak: u32,
    /// When this record was computed.
    pub last_calculated_at: DateTime<Utc>,
    /// The per-day session target the record was computed against.
    pub daily_target: u32,
}

impl StreakRecord {
    /// The zero-value record used when no usable data exists.
    pub fn zero(daily_target: u32, now: DateTime<Utc>) -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            last_calculated_at: now,
            daily_target,
        }
    }
}

/// Detailed view of where today stands relative to the streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStatus {
    /// Streak with the grace period applied.
    pub current_streak: u32,
    /// Streak without the grace period.
    pub strict_streak: u32,
    /// Sessions logged on today's habit day so far.
    pub today_sessions_count: u32,
    /// Sessions still needed to complete today.
    pub today_sessions_needed: u32,
    /// Whether today already met the daily target.
    pub today_completed: bool,
    /// True when today is done or the grace period is holding the
    /// streak open.
    pub is_streak_continuing: bool,
}

/// A maximal run of consecutive successful habit days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPeriod {
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    /// Run length in days, always >= 1.
    pub duration: u32,
}

/// All streak periods in a lookback window, sorted by duration
/// descending; ties broken by the more recent start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakHistory {
    pub periods: Vec<StreakPeriod>,
}

impl StreakHistory {
    /// Duration of the longest period, 0 when empty.
    pub fn longest(&self) -> u32 {
        self.periods.first().map(|p| p.duration).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Streak calculator. Pure: every method takes an explicit `now` so the
/// same inputs always yield the same result.
#[derive(Debug, Clone, Copy)]
pub struct StreakCalculator {
    calendar: HabitCalendar,
}

impl StreakCalculator {
    pub fn new(calendar: HabitCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &HabitCalendar {
        &self.calendar
    }

    /// Count consecutive successful habit days ending at today.
    ///
    /// With `grace_period`, an incomplete today is skipped (neither
    /// counted nor streak-breaking) and the walk resumes at yesterday.
    /// Without it, an incomplete today terminates the walk immediately.
    ///
    /// # Errors
    /// Rejects `daily_target == 0`. An empty or unusable session set is
    /// not an error; it yields 0.
    pub fn streak(
        &self,
        sessions: &[Session],
        daily_target: u32,
        grace_period: bool,
        now: DateTime<Utc>,
    ) -> Result<u32, ValidationError> {
        ensure_positive(daily_target, "daily_target")?;

        let counts = self.day_counts(sessions);
        let successful = |day: &NaiveDate| counts.get(day).copied().unwrap_or(0) >= daily_target;

        let mut day = self.calendar.today(now);
        if !successful(&day) {
            if !grace_period {
                return Ok(0);
            }
            match day.checked_sub_days(Days::new(1)) {
                Some(prev) => day = prev,
                None => return Ok(0),
            }
        }

        let mut streak = 0u32;
        while successful(&day) {
            streak += 1;
            match day.checked_sub_days(Days::new(1)) {
                Some(prev) => day = prev,
                None => break,
            }
        }
        Ok(streak)
    }

    /// Grace-aware and strict streaks side by side, plus today's progress.
    pub fn status(
        &self,
        sessions: &[Session],
        daily_target: u32,
        now: DateTime<Utc>,
    ) -> Result<StreakStatus, ValidationError> {
        let current_streak = self.streak(sessions, daily_target, true, now)?;
        let strict_streak = self.streak(sessions, daily_target, false, now)?;

        let counts = self.day_counts(sessions);
        let today = self.calendar.today(now);
        let today_sessions_count = counts.get(&today).copied().unwrap_or(0);
        let today_completed = today_sessions_count >= daily_target;

        Ok(StreakStatus {
            current_streak,
            strict_streak,
            today_sessions_count,
            today_sessions_needed: daily_target.saturating_sub(today_sessions_count),
            today_completed,
            is_streak_continuing: today_completed || current_streak > strict_streak,
        })
    }

    /// Reconstruct all streak periods inside the lookback window.
    ///
    /// Scans chronologically oldest to newest. A run closes on the first
    /// unsuccessful day; a run still alive at today's habit day stays
    /// open through it (inclusive).
    pub fn history(
        &self,
        sessions: &[Session],
        daily_target: u32,
        lookback_days: u32,
        now: DateTime<Utc>,
    ) -> Result<StreakHistory, ValidationError> {
        ensure_positive(daily_target, "daily_target")?;
        ensure_positive(lookback_days, "lookback_days")?;

        let counts = self.day_counts(sessions);
        let today = self.calendar.today(now);
        let start = today
            .checked_sub_days(Days::new(u64::from(lookback_days) - 1))
            .unwrap_or(today);

        let mut periods: Vec<StreakPeriod> = Vec::new();
        let mut run_start: Option<NaiveDate> = None;
        let mut day = start;
        loop {
            let successful = counts.get(&day).copied().unwrap_or(0) >= daily_target;
            if successful && run_start.is_none() {
                run_start = Some(day);
            }
            if !successful {
                if let Some(first) = run_start.take() {
                    if let Some(last) = day.checked_sub_days(Days::new(1)) {
                        periods.push(make_period(first, last));
                    }
                }
            }
            if day >= today {
                break;
            }
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }
        // Trailing open run reaching today.
        if let Some(first) = run_start {
            periods.push(make_period(first, today));
        }

        periods.sort_by(|a, b| {
            b.duration
                .cmp(&a.duration)
                .then_with(|| b.start_day.cmp(&a.start_day))
        });

        Ok(StreakHistory { periods })
    }

    /// Full [`StreakRecord`] for a session set: current streak plus the
    /// longest run in the window.
    pub fn record(
        &self,
        sessions: &[Session],
        daily_target: u32,
        lookback_days: u32,
        grace_period: bool,
        now: DateTime<Utc>,
    ) -> Result<StreakRecord, ValidationError> {
        let current_streak = self.streak(sessions, daily_target, grace_period, now)?;
        let history = self.history(sessions, daily_target, lookback_days, now)?;

        Ok(StreakRecord {
            current_streak,
            longest_streak: history.longest().max(current_streak),
            last_calculated_at: now,
            daily_target,
        })
    }

    /// Sessions attributed to the days of the current grace-aware run,
    /// plus today's in-progress sessions.
    pub fn current_period_session_count(
        &self,
        sessions: &[Session],
        daily_target: u32,
        now: DateTime<Utc>,
    ) -> Result<u32, ValidationError> {
        ensure_positive(daily_target, "daily_target")?;

        let counts = self.day_counts(sessions);
        let successful = |day: &NaiveDate| counts.get(day).copied().unwrap_or(0) >= daily_target;

        let today = self.calendar.today(now);
        let mut total = counts.get(&today).copied().unwrap_or(0);

        let mut day = today;
        if !successful(&day) {
            match day.checked_sub_days(Days::new(1)) {
                Some(prev) => day = prev,
                None => return Ok(total),
            }
        }
        while successful(&day) {
            if day != today {
                total += counts.get(&day).copied().unwrap_or(0);
            }
            match day.checked_sub_days(Days::new(1)) {
                Some(prev) => day = prev,
                None => break,
            }
        }
        Ok(total)
    }

    /// Group usable sessions by habit day. Records with no derivable day
    /// are skipped, never fatal.
    fn day_counts(&self, sessions: &[Session]) -> BTreeMap<NaiveDate, u32> {
        let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for session in sessions {
            if let Some(day) = session.day(&self.calendar) {
                *counts.entry(day).or_insert(0) += 1;
            }
        }
        counts
    }
}

fn make_period(start_day: NaiveDate, end_day: NaiveDate) -> StreakPeriod {
    let duration = (end_day - start_day).num_days().max(0) as u32 + 1;
    StreakPeriod {
        start_day,
        end_day,
        duration,
    }
}

fn ensure_positive(value: u32, field: &str) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::non_positive(field));
    }
    Ok(())
}
