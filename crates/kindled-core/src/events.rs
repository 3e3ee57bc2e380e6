//! Engine events and the publish/subscribe notifier.
//!
//! Every streak recomputation produces an [`EngineEvent`]; the UI and
//! other collaborators subscribe to the variants they care about. A
//! failing subscriber is isolated: its error (or panic) is logged and
//! the remaining subscribers still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::milestone;

/// Event category used for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    StreakUpdated,
    StreakCalculated,
    HistoryUpdated,
}

/// Every streak recomputation in the engine produces one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// The current streak value changed after a session was recorded.
    StreakUpdated {
        user_id: String,
        previous: u32,
        current: u32,
        at: DateTime<Utc>,
    },
    /// A streak record was recomputed (value may be unchanged).
    StreakCalculated {
        user_id: String,
        current_streak: u32,
        longest_streak: u32,
        at: DateTime<Utc>,
    },
    /// The streak history was rebuilt.
    HistoryUpdated {
        user_id: String,
        period_count: usize,
        longest_duration: u32,
        at: DateTime<Utc>,
    },
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::StreakUpdated { .. } => EventKind::StreakUpdated,
            EngineEvent::StreakCalculated { .. } => EventKind::StreakCalculated,
            EngineEvent::HistoryUpdated { .. } => EventKind::HistoryUpdated,
        }
    }
}

/// Subscriber callbacks report failures instead of panicking; both are
/// tolerated, neither reaches sibling subscribers.
pub type SubscriberResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Callback = Box<dyn Fn(&EngineEvent) -> SubscriberResult + Send + Sync>;

struct Subscriber {
    id: u64,
    kind: EventKind,
    callback: Callback,
}

/// Handle returned by [`EventNotifier::subscribe`]; pass it back to
/// [`EventNotifier::unsubscribe`] to dispose of the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "dropping the handle leaks the subscription"]
pub struct Subscription {
    id: u64,
}

/// Single-process publish/subscribe hub.
#[derive(Default)]
pub struct EventNotifier {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one event kind.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&EngineEvent) -> SubscriberResult + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                id,
                kind,
                callback: Box::new(callback),
            });
        Subscription { id }
    }

    /// Remove a subscription. Unknown handles are a no-op.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|s| s.id != subscription.id);
    }

    /// Broadcast an event to every matching subscriber.
    ///
    /// Callbacks must not subscribe or unsubscribe from inside the
    /// dispatch; the subscriber list is locked for its duration.
    pub fn emit(&self, event: &EngineEvent) {
        let kind = event.kind();
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for subscriber in subscribers.iter().filter(|s| s.kind == kind) {
            match catch_unwind(AssertUnwindSafe(|| (subscriber.callback)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(subscriber = subscriber.id, error = %e, "subscriber failed, continuing");
                }
                Err(_) => {
                    warn!(subscriber = subscriber.id, "subscriber panicked, continuing");
                }
            }
        }
    }

    /// Number of live subscriptions for a kind.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    /// Whether a streak change crossed a phase boundary upward. Lets the
    /// UI decide when to show a celebratory moment without the engine
    /// knowing anything about rendering.
    pub fn should_celebrate(&self, previous: u32, current: u32) -> bool {
        milestone::should_celebrate(previous, current)
    }
}
