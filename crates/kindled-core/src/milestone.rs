//! Streak phases and celebration milestones.
//!
//! Streak depth maps onto a fixed ordered set of buckets. The UI layer
//! uses the phase for theming and the bucket transition as the cue for a
//! celebratory moment; the engine only reports the mapping and the
//! transition, never how to render it.

use serde::{Deserialize, Serialize};

/// Named streak-depth bucket.
///
/// Boundaries: 0, 1, 2-3, 4-7, 8-14, 15-30, 31-60, 61-100, 101+.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPhase {
    /// No active streak.
    Dormant,
    /// First successful day.
    Spark,
    /// 2-3 days.
    Kindling,
    /// 4-7 days.
    Flame,
    /// 8-14 days.
    Campfire,
    /// 15-30 days.
    Bonfire,
    /// 31-60 days.
    Blaze,
    /// 61-100 days.
    Wildfire,
    /// 101 days and beyond.
    Eternal,
}

impl StreakPhase {
    /// All phases in ascending order.
    pub const ALL: [StreakPhase; 9] = [
        StreakPhase::Dormant,
        StreakPhase::Spark,
        StreakPhase::Kindling,
        StreakPhase::Flame,
        StreakPhase::Campfire,
        StreakPhase::Bonfire,
        StreakPhase::Blaze,
        StreakPhase::Wildfire,
        StreakPhase::Eternal,
    ];

    /// The phase a streak of `streak` days falls into.
    pub fn of(streak: u32) -> Self {
        match streak {
            0 => StreakPhase::Dormant,
            1 => StreakPhase::Spark,
            2..=3 => StreakPhase::Kindling,
            4..=7 => StreakPhase::Flame,
            8..=14 => StreakPhase::Campfire,
            15..=30 => StreakPhase::Bonfire,
            31..=60 => StreakPhase::Blaze,
            61..=100 => StreakPhase::Wildfire,
            _ => StreakPhase::Eternal,
        }
    }

    /// First streak value inside this phase.
    pub fn min_days(&self) -> u32 {
        match self {
            StreakPhase::Dormant => 0,
            StreakPhase::Spark => 1,
            StreakPhase::Kindling => 2,
            StreakPhase::Flame => 4,
            StreakPhase::Campfire => 8,
            StreakPhase::Bonfire => 15,
            StreakPhase::Blaze => 31,
            StreakPhase::Wildfire => 61,
            StreakPhase::Eternal => 101,
        }
    }

    /// Human-readable phase name.
    pub fn label(&self) -> &'static str {
        match self {
            StreakPhase::Dormant => "Dormant",
            StreakPhase::Spark => "Spark",
            StreakPhase::Kindling => "Kindling",
            StreakPhase::Flame => "Flame",
            StreakPhase::Campfire => "Campfire",
            StreakPhase::Bonfire => "Bonfire",
            StreakPhase::Blaze => "Blaze",
            StreakPhase::Wildfire => "Wildfire",
            StreakPhase::Eternal => "Eternal",
        }
    }

    /// The phase after this one, if any.
    pub fn next(&self) -> Option<StreakPhase> {
        let idx = StreakPhase::ALL.iter().position(|p| p == self)?;
        StreakPhase::ALL.get(idx + 1).copied()
    }
}

/// Streak depth needed to enter the next phase, `None` at the top.
pub fn next_milestone(streak: u32) -> Option<u32> {
    StreakPhase::of(streak).next().map(|p| p.min_days())
}

/// Days remaining until the next phase boundary.
pub fn days_until_next(streak: u32) -> Option<u32> {
    next_milestone(streak).map(|m| m.saturating_sub(streak))
}

/// Whether moving from `prev` to `cur` crossed a phase boundary upward.
///
/// Only growth celebrates: shrinking across a boundary (a broken streak)
/// returns false.
pub fn should_celebrate(prev: u32, cur: u32) -> bool {
    cur > prev && StreakPhase::of(cur) != StreakPhase::of(prev)
}
