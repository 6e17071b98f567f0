//! Per-topic debounce for warning messages.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use tokio::time::Instant;

use crate::types::TopicId;

/// Once the map holds this many topics, stale entries are dropped on the
/// next check.
const PRUNE_THRESHOLD: usize = 1024;

/// Remembers when each topic last got a warning.
///
/// Check-and-record happens under one `std::sync::Mutex` that is never held
/// across an `.await`, so concurrent callers for the same topic see exactly
/// one `true` per window.
pub struct WarningThrottle {
    window: Duration,
    last_warning: Mutex<HashMap<TopicId, Instant>>,
}

impl WarningThrottle {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_warning: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` and records `now` if no warning was recorded for
    /// `topic`, or the last one is more than `window` old.
    pub fn should_warn(&self, topic: TopicId, now: Instant) -> bool {
        let mut last = self
            .last_warning
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if last.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            last.retain(|_, at| now.saturating_duration_since(*at) <= window);
        }

        if let Some(previous) = last.get(&topic)
            && now.saturating_duration_since(*previous) <= self.window
        {
            return false;
        }
        last.insert(topic, now);
        true
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.last_warning
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
