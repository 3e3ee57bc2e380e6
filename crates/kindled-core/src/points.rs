//! Per-session reward scoring.
//!
//! Two independent halves. Base points come from a single session's
//! duration ratio against its target and are capped for under-target
//! sessions, so one marathon session can never dominate. Bonus points
//! come from the projected daily streak and are deliberately unbounded
//! as the long-horizon incentive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::session::Session;
use crate::streak::StreakCalculator;

/// Points awarded for meeting the session target exactly.
pub const TARGET_MET_BASE: u32 = 100;
/// Extra base points per consecutive on-target session.
pub const TIME_STREAK_STEP: u32 = 10;
/// Bonus points per day of daily streak.
pub const DAILY_BONUS_STEP: u32 = 50;

/// Outcome of scoring one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsResult {
    /// Duration-ratio component; in [0, 100] for under-target sessions.
    pub base_points: u32,
    /// Daily-streak component, unbounded.
    pub bonus_points: u32,
    /// `base_points + bonus_points`.
    pub total: u32,
    /// Post-session consecutive on-target count, ready to persist for
    /// the next call.
    pub time_streak: u32,
    /// The daily streak as it stands once this session is persisted.
    pub daily_streak: u32,
}

/// Session scorer. Stateless; daily-streak projection delegates to the
/// shared [`StreakCalculator`] so day attribution stays in one place.
#[derive(Debug, Clone, Copy)]
pub struct PointsCalculator {
    streaks: StreakCalculator,
}

impl PointsCalculator {
    pub fn new(streaks: StreakCalculator) -> Self {
        Self { streaks }
    }

    /// Score `current` against `target_seconds`.
    ///
    /// `recent` must be ordered newest-first; the time-streak scan walks
    /// it from the front and stops at the first session that missed its
    /// own target. The daily streak is computed over `current` plus
    /// `recent`, i.e. the streak as it becomes once this session lands.
    ///
    /// # Errors
    /// Rejects `target_seconds == 0` and `daily_target == 0` before any
    /// computation.
    pub fn score(
        &self,
        target_seconds: u32,
        current: &Session,
        recent: &[Session],
        daily_target: u32,
        now: DateTime<Utc>,
    ) -> Result<PointsResult, ValidationError> {
        if target_seconds == 0 {
            return Err(ValidationError::non_positive("target_seconds"));
        }
        if daily_target == 0 {
            return Err(ValidationError::non_positive("daily_target"));
        }

        let time_streak = recent.iter().take_while(|s| s.met_target()).count() as u32;

        let met = current.duration_seconds >= target_seconds;
        let base_points = if met {
            TARGET_MET_BASE + TIME_STREAK_STEP * time_streak
        } else {
            let ratio = f64::from(current.duration_seconds) / f64::from(target_seconds);
            ((ratio * 100.0).round() as u32).min(TARGET_MET_BASE)
        };

        let mut combined = Vec::with_capacity(recent.len() + 1);
        combined.push(current.clone());
        combined.extend_from_slice(recent);
        let daily_streak =
            self.streaks
                .streak(&combined, daily_target, true, now)?;

        let bonus_points = daily_streak * DAILY_BONUS_STEP;

        Ok(PointsResult {
            base_points,
            bonus_points,
            total: base_points + bonus_points,
            time_streak: if met { time_streak + 1 } else { 0 },
            daily_streak,
        })
    }
}
