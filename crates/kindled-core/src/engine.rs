//! Streak engine service.
//!
//! Wires the collaborators together: fetch sessions from the store, run
//! the pure calculators, refresh the cache, notify subscribers. The
//! stages are explicit and independent: a fetch failure degrades to
//! cached data, a cache or notifier failure never masks a successful
//! computation. Only malformed caller input surfaces as an error.
//!
//! The engine is a plain service object with no global state; construct
//! one per process (or per test) and pass it by reference.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::StreakCache;
use crate::config::EngineConfig;
use crate::error::{Result, StoreError, ValidationError};
use crate::events::{EngineEvent, EventKind, EventNotifier, SubscriberResult, Subscription};
use crate::points::{PointsCalculator, PointsResult};
use crate::session::Session;
use crate::streak::{StreakCalculator, StreakHistory, StreakRecord, StreakStatus};

/// Supplies session records for a user within a date window.
///
/// Implementations live outside the core (SQLite, a sync backend, a
/// test fixture); the engine only ever sees the materialized list.
pub trait SessionStore: Send + Sync {
    /// Fetch a user's sessions at or after `since`. Order is not
    /// required; the engine sorts and groups internally.
    fn fetch_sessions(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> std::result::Result<Vec<Session>, StoreError>;
}

/// Aggregate streak view for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakData {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub history: StreakHistory,
    pub current_period_session_count: u32,
}

/// The habit-streak and scoring engine.
pub struct StreakEngine {
    config: EngineConfig,
    streaks: StreakCalculator,
    points: PointsCalculator,
    cache: StreakCache,
    notifier: EventNotifier,
    store: Box<dyn SessionStore>,
}

impl StreakEngine {
    /// Build an engine over a session store.
    ///
    /// # Errors
    /// Rejects invalid configuration (zero targets, out-of-range
    /// boundary hour) before anything runs.
    pub fn new(store: Box<dyn SessionStore>, config: EngineConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let streaks = StreakCalculator::new(config.calendar()?);
        Ok(Self {
            points: PointsCalculator::new(streaks),
            cache: StreakCache::new().with_ttl_secs(config.cache_ttl_secs),
            notifier: EventNotifier::new(),
            streaks,
            config,
            store,
        })
    }

    /// Swap in a cache with a custom backend.
    pub fn with_cache(mut self, cache: StreakCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn notifier(&self) -> &EventNotifier {
        &self.notifier
    }

    /// Current streak for a user.
    ///
    /// Served from cache when fresh; otherwise fetched and recomputed.
    /// A store failure falls back to the last cached value, then to 0.
    /// Never an error: absence of data is a zero streak.
    pub fn current_streak(&self, user_id: &str) -> u32 {
        let now = Utc::now();
        if let Some(record) = self.cache.record(user_id, now) {
            debug!(user_id, streak = record.current_streak, "streak served from cache");
            return record.current_streak;
        }

        match self.fetch(user_id, now) {
            Ok(sessions) => self
                .recompute(user_id, &sessions, now)
                .map(|(record, _)| record.current_streak)
                .unwrap_or(0),
            Err(e) => {
                warn!(user_id, error = %e, "session store unavailable, serving cached streak");
                self.cache
                    .stale_record(user_id)
                    .map(|record| record.current_streak)
                    .unwrap_or(0)
            }
        }
    }

    /// Full streak view: current and longest streak, period history, and
    /// the session count of the live run.
    ///
    /// Always consults the store (the live-run session count cannot be
    /// answered from the cached record alone); on store failure serves
    /// whatever the cache still holds.
    pub fn streak_data(&self, user_id: &str) -> StreakData {
        let now = Utc::now();
        let target = self.config.daily_target;

        let sessions = match self.fetch(user_id, now) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(user_id, error = %e, "session store unavailable, serving cached streak data");
                let record = self
                    .cache
                    .stale_record(user_id)
                    .unwrap_or_else(|| StreakRecord::zero(target, now));
                return StreakData {
                    current_streak: record.current_streak,
                    longest_streak: record.longest_streak,
                    history: self.cache.history(now).unwrap_or_default(),
                    current_period_session_count: 0,
                };
            }
        };

        let (record, history) = self
            .recompute(user_id, &sessions, now)
            .unwrap_or_else(|| (StreakRecord::zero(target, now), StreakHistory::default()));
        let count = self
            .streaks
            .current_period_session_count(&sessions, target, now)
            .unwrap_or(0);

        StreakData {
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            history,
            current_period_session_count: count,
        }
    }

    /// Today's progress against the daily target.
    ///
    /// On store failure this degrades to the empty-session status (all
    /// zeros, full target remaining) rather than erroring.
    pub fn streak_status(&self, user_id: &str) -> StreakStatus {
        let now = Utc::now();
        let target = self.config.daily_target;
        let sessions = match self.fetch(user_id, now) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(user_id, error = %e, "session store unavailable, serving empty status");
                Vec::new()
            }
        };
        self.streaks
            .status(&sessions, target, now)
            .unwrap_or(StreakStatus {
                current_streak: 0,
                strict_streak: 0,
                today_sessions_count: 0,
                today_sessions_needed: target,
                today_completed: false,
                is_streak_continuing: false,
            })
    }

    /// Record a session: score it, refresh the cache past its TTL, and
    /// notify subscribers of any streak change.
    ///
    /// # Errors
    /// Only invalid input (`target_seconds == 0`) is an error. Store,
    /// cache, and subscriber failures are logged and absorbed.
    pub fn record_session_and_score(
        &self,
        user_id: &str,
        session: Session,
    ) -> Result<PointsResult> {
        let now = Utc::now();
        let target = self.config.daily_target;

        // Fetch: fallible. Without history the session still scores,
        // just with no streak context.
        let mut recent = match self.fetch(user_id, now) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(user_id, error = %e, "session store unavailable, scoring without history");
                Vec::new()
            }
        };
        recent.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

        let previous_streak = self
            .cache
            .stale_record(user_id)
            .map(|record| record.current_streak)
            .unwrap_or_else(|| {
                self.streaks
                    .streak(&recent, target, self.config.grace_period, now)
                    .unwrap_or(0)
            });

        // Compute: pure; only invalid input can fail, and it fails here
        // before any state is touched.
        let result = self
            .points
            .score(session.target_seconds, &session, &recent, target, now)?;

        // Cache write: best-effort, TTL bypassed by overwriting.
        let mut all = recent;
        all.push(session);
        let record = self.recompute(user_id, &all, now);

        // Notify: best-effort, isolated per subscriber.
        if let Some((record, _)) = record {
            if record.current_streak != previous_streak {
                self.notifier.emit(&EngineEvent::StreakUpdated {
                    user_id: user_id.to_string(),
                    previous: previous_streak,
                    current: record.current_streak,
                    at: now,
                });
            }
        }

        Ok(result)
    }

    /// Register a callback for an event kind. Returns the handle to pass
    /// to [`EventNotifier::unsubscribe`] via [`StreakEngine::notifier`].
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&EngineEvent) -> SubscriberResult + Send + Sync + 'static,
    {
        self.notifier.subscribe(kind, callback)
    }

    /// Recompute a user's record and history from a session list, then
    /// repopulate the cache and announce the recalculation.
    ///
    /// Returns `None` only if the calculators reject the configured
    /// targets, which `new` already rules out.
    fn recompute(
        &self,
        user_id: &str,
        sessions: &[Session],
        now: DateTime<Utc>,
    ) -> Option<(StreakRecord, StreakHistory)> {
        let target = self.config.daily_target;
        let lookback = self.config.lookback_days;

        let record = match self.streaks.record(
            sessions,
            target,
            lookback,
            self.config.grace_period,
            now,
        ) {
            Ok(record) => record,
            Err(e) => {
                warn!(user_id, error = %e, "streak recomputation failed");
                return None;
            }
        };
        let history = match self.streaks.history(sessions, target, lookback, now) {
            Ok(history) => history,
            Err(e) => {
                warn!(user_id, error = %e, "history recomputation failed");
                return None;
            }
        };

        self.cache.put_record(user_id, &record, now);
        self.cache.put_history(&history, now);

        self.notifier.emit(&EngineEvent::StreakCalculated {
            user_id: user_id.to_string(),
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            at: now,
        });
        self.notifier.emit(&EngineEvent::HistoryUpdated {
            user_id: user_id.to_string(),
            period_count: history.periods.len(),
            longest_duration: history.longest(),
            at: now,
        });

        Some((record, history))
    }

    fn fetch(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Vec<Session>, StoreError> {
        let since = now - Duration::days(i64::from(self.config.lookback_days));
        self.store.fetch_sessions(user_id, since)
    }
}
