//! # Kindled Core Library
//!
//! This library provides the habit-streak and points-scoring engine for
//! Kindled. It turns a raw, possibly sparse log of timestamped activity
//! sessions into a consecutive habit-day streak and a per-session reward
//! score that compounds with recent consistency. Everything around it
//! (screens, notifications, the backing store) is a thin collaborator
//! over this core.
//!
//! ## Architecture
//!
//! - **Habit Calendar**: maps timestamps to habit days under a
//!   configurable non-midnight day boundary (default 03:00)
//! - **Streak Calculator**: consecutive successful days with a grace
//!   period for the still-open current day, plus history reconstruction
//! - **Points Calculator**: bounded base points from duration ratio,
//!   unbounded bonus points from daily consistency
//! - **Streak Cache**: TTL'd per-user records, force-refreshed when a
//!   session is recorded
//! - **Event Notifier**: typed publish/subscribe for streak changes and
//!   milestone crossings
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: the service object tying the stages together
//! - [`StreakCalculator`] / [`PointsCalculator`]: the pure calculators
//! - [`EngineConfig`]: TOML-backed configuration
//! - [`SessionStore`]: trait for the external session source

pub mod cache;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod milestone;
pub mod points;
pub mod session;
pub mod streak;

pub use cache::{CacheBackend, CacheEntry, MemoryBackend, StreakCache};
pub use calendar::HabitCalendar;
pub use config::EngineConfig;
pub use engine::{SessionStore, StreakData, StreakEngine};
pub use error::{CacheError, ConfigError, CoreError, StoreError, ValidationError};
pub use events::{EngineEvent, EventKind, EventNotifier, Subscription};
pub use milestone::{should_celebrate, StreakPhase};
pub use points::{PointsCalculator, PointsResult};
pub use session::Session;
pub use streak::{
    StreakCalculator, StreakHistory, StreakPeriod, StreakRecord, StreakStatus,
};
