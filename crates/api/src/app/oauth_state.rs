//! One-time `state` values for the OAuth login round trip.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// How long a login attempt may take before its state is forgotten.
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Most login attempts kept at once; the oldest is dropped beyond this.
pub const MAX_PENDING_STATES: usize = 1024;

/// In-memory store of outstanding OAuth `state` values.
///
/// A state is accepted once, and only before it expires.
#[derive(Debug, Clone)]
pub struct OAuthStateStore {
    inner: Arc<Mutex<HashMap<String, Instant>>>,
    ttl: Duration,
    max_pending: usize,
}

impl Default for OAuthStateStore {
    fn default() -> Self {
        Self::new(STATE_TTL)
    }
}

impl OAuthStateStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            max_pending: MAX_PENDING_STATES,
        }
    }

    /// Mint and remember a fresh state.
    pub fn issue(&self) -> String {
        self.issue_at(Instant::now())
    }

    /// Accept `state` if it was issued, unused and unexpired.
    pub fn consume(&self, state: &str) -> bool {
        self.consume_at(state, Instant::now())
    }

    fn issue_at(&self, now: Instant) -> String {
        let state = uuid::Uuid::new_v4().simple().to_string();
        let mut map = self.lock();
        map.retain(|_, issued| now.saturating_duration_since(*issued) < self.ttl);
        while map.len() >= self.max_pending {
            let oldest = map
                .iter()
                .min_by_key(|(_, issued)| **issued)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    map.remove(&key);
                }
                None => break,
            }
        }
        map.insert(state.clone(), now);
        state
    }

    fn consume_at(&self, state: &str, now: Instant) -> bool {
        match self.lock().remove(state) {
            Some(issued) => now.saturating_duration_since(issued) < self.ttl,
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        // A poisoned map only holds timestamps; keep using it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_single_use() {
        let store = OAuthStateStore::default();
        let state = store.issue();
        assert!(store.consume(&state));
        assert!(!store.consume(&state));
        assert!(!store.consume("never-issued"));
    }

    #[test]
    fn pending_states_are_bounded() {
        let store = OAuthStateStore {
            max_pending: 3,
            ..OAuthStateStore::default()
        };
        let start = Instant::now();
        let first = store.issue_at(start);
        let second = store.issue_at(start + Duration::from_secs(1));
        for i in 2..10 {
            store.issue_at(start + Duration::from_secs(i));
        }
        assert_eq!(store.pending(), 3);
        assert!(!store.consume_at(&first, start + Duration::from_secs(20)));
        assert!(!store.consume_at(&second, start + Duration::from_secs(20)));

        let newest = store.issue_at(start + Duration::from_secs(30));
        assert!(store.consume_at(&newest, start + Duration::from_secs(31)));
    }

    #[test]
    fn expired_states_are_rejected_and_pruned() {
        let store = OAuthStateStore::new(Duration::from_secs(60));
        let start = Instant::now();
        let old = store.issue_at(start);
        assert!(!store.consume_at(&old, start + Duration::from_secs(61)));

        store.issue_at(start);
        store.issue_at(start + Duration::from_secs(120));
        assert_eq!(store.pending(), 1);
    }
}
