//! # TTL slot
//! Single-slot cache with an absolute time-to-live (no sliding refresh).
//!
//! The slot is replaced wholesale on `set`; there is no partial invalidation.
//! Reads never block on a refresh in flight: two callers that both observe a
//! stale slot will both refresh, and the last writer wins.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    stored_at: DateTime<Utc>,
}

pub struct TtlSlot<T> {
    inner: Mutex<Option<Entry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TtlSlot<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(None),
            ttl,
            clock,
        }
    }

    /// Value if one is stored and younger than the TTL.
    pub fn get(&self) -> Option<T> {
        let now = self.clock.now();
        let g = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        g.as_ref()
            .filter(|e| now - e.stored_at < self.ttl)
            .map(|e| e.value.clone())
    }

    pub fn set(&self, value: T) {
        let entry = Entry {
            value,
            stored_at: self.clock.now(),
        };
        *self.inner.lock().unwrap_or_else(|p| p.into_inner()) = Some(entry);
    }

    pub fn is_fresh(&self) -> bool {
        let now = self.clock.now();
        let g = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        g.as_ref().is_some_and(|e| now - e.stored_at < self.ttl)
    }

    /// When the current value was stored, fresh or not.
    pub fn stored_at(&self) -> Option<DateTime<Utc>> {
        let g = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        g.as_ref().map(|e| e.stored_at)
    }

    pub fn clear(&self) {
        *self.inner.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
