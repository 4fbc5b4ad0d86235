//! Per-session draw history.
//!
//! Each session owns its own mutex. The map lock is only held long enough to
//! find or create that mutex, so sessions never wait on each other. Sessions
//! idle for longer than the store's TTL are dropped by `evict_idle`.

use std::{
    sync::{Arc, Mutex, MutexGuard, TryLockError},
    time::{Duration, Instant},
};

use dashmap::DashMap;

use super::SeenSet;

#[derive(Debug)]
struct Session {
    seen: SeenSet,
    last_access: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            seen: SeenSet::new(),
            last_access: Instant::now(),
        }
    }
}

type Entry = Arc<Mutex<Session>>;

fn lock(entry: &Entry) -> MutexGuard<'_, Session> {
    match entry.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Entry>>,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    /// A store whose sessions never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose sessions expire after `idle_ttl` without a request.
    /// `None` keeps sessions forever.
    pub fn with_idle_ttl(idle_ttl: Option<Duration>) -> Self {
        Self {
            sessions: Arc::default(),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl
    }

    fn entry(&self, session_id: &str) -> Entry {
        if let Some(existing) = self.sessions.get(session_id) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())));
        Arc::clone(entry.value())
    }

    /// Run `f` against the session's history while holding that session's lock.
    /// The history is created empty on first access; every call refreshes the
    /// session's last access time.
    pub fn with_history<T>(&self, session_id: &str, f: impl FnOnce(&mut SeenSet) -> T) -> T {
        let entry = self.entry(session_id);
        let mut session = lock(&entry);
        session.last_access = Instant::now();
        f(&mut session.seen)
    }

    /// Copy of the session's history, if the session exists.
    pub fn snapshot(&self, session_id: &str) -> Option<SeenSet> {
        let entry = self.sessions.get(session_id).map(|e| Arc::clone(e.value()))?;
        let session = lock(&entry);
        Some(session.seen.clone())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop every session idle for longer than the TTL. Returns how many went.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    fn evict_idle_at(&self, now: Instant) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };
        let mut evicted = 0;
        self.sessions.retain(|_, entry| {
            let keep = match entry.try_lock() {
                Ok(session) => now.saturating_duration_since(session.last_access) <= ttl,
                Err(TryLockError::Poisoned(poisoned)) => {
                    now.saturating_duration_since(poisoned.into_inner().last_access) <= ttl
                }
                // a request is drawing right now
                Err(TryLockError::WouldBlock) => true,
            };
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::models::PointKey;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn creates_history_on_first_access() {
        let store = SessionStore::new();
        assert!(store.snapshot("a").is_none());

        let len = store.with_history("a", |seen| seen.len());
        assert_eq!(len, 0);
        assert_eq!(store.snapshot("a"), Some(SeenSet::new()));
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn sessions_are_independent() {
        let store = SessionStore::new();
        store.with_history("a", |seen| seen.record(PointKey::new(1, 1)));
        store.with_history("b", |seen| seen.record(PointKey::new(2, 2)));

        assert_eq!(store.snapshot("a").unwrap().keys(), &[PointKey::new(1, 1)]);
        assert_eq!(store.snapshot("b").unwrap().keys(), &[PointKey::new(2, 2)]);
    }

    #[test]
    fn concurrent_updates_to_one_session_are_serialized() {
        let store = SessionStore::new();
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        store.with_history("shared", |seen| {
                            seen.record(PointKey::new(worker, i));
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.snapshot("shared").unwrap().len(), 400);
    }

    #[test]
    fn idle_sessions_are_dropped() {
        let store = SessionStore::with_idle_ttl(Some(TTL));
        store.with_history("idle", |seen| seen.record(PointKey::new(1, 1)));
        store.with_history("active", |seen| seen.record(PointKey::new(2, 2)));

        let now = Instant::now();
        // "active" was last used 50s after "idle"
        lock(&store.entry("active")).last_access = now + Duration::from_secs(50);

        assert_eq!(store.evict_idle_at(now + Duration::from_secs(90)), 1);
        assert!(store.snapshot("idle").is_none());
        assert_eq!(store.snapshot("active").unwrap().keys(), &[PointKey::new(2, 2)]);

        // a returning client simply starts over
        assert_eq!(store.with_history("idle", |seen| seen.len()), 0);
    }

    #[test]
    fn fresh_sessions_survive_a_sweep() {
        let store = SessionStore::with_idle_ttl(Some(TTL));
        store.with_history("a", |seen| seen.record(PointKey::new(1, 1)));

        assert_eq!(store.evict_idle(), 0);
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn busy_session_is_never_evicted() {
        let store = SessionStore::with_idle_ttl(Some(TTL));
        let far_future = Instant::now() + Duration::from_secs(3600);

        let evicted = store.with_history("busy", |_| store.evict_idle_at(far_future));
        assert_eq!(evicted, 0);
        assert!(store.snapshot("busy").is_some());
    }

    #[test]
    fn without_ttl_nothing_expires() {
        let store = SessionStore::new();
        store.with_history("a", |_| ());

        let far_future = Instant::now() + Duration::from_secs(365 * 24 * 3600);
        assert_eq!(store.evict_idle_at(far_future), 0);
        assert_eq!(store.session_count(), 1);
    }
}
