//! Two-tier session store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::persistence::SessionPersistence;
use crate::session::{Session, UserId};
use crate::token::{generate_token, token_prefix};

/// State protected by the cache mutex.
#[derive(Default)]
struct CacheState {
    /// Live sessions keyed by token.
    sessions: HashMap<String, Session>,

    /// Bumped on every destroy. A fallback lookup only repopulates the cache
    /// if no destroy happened while it was doing I/O.
    invalidations: u64,
}

struct StoreInner<P> {
    cache: Mutex<CacheState>,
    persistence: P,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

/// Session store with an in-memory fast path and a durable fallback.
///
/// - The cache mutex is held only for map access, never across calls into
///   the [`SessionPersistence`] backend.
/// - Expiry is absolute: a session is valid iff `now < login_time + max_life_time`,
///   whichever tier answers.
/// - Cloning is cheap; clones share the same cache and backend.
pub struct SessionStore<P: SessionPersistence> {
    inner: Arc<StoreInner<P>>,
}

impl<P: SessionPersistence> SessionStore<P> {
    /// Create a session store backed by `persistence`, using wall-clock time.
    pub fn new(config: SessionConfig, persistence: P) -> Self {
        Self::with_clock(config, persistence, Arc::new(SystemClock))
    }

    /// Create a session store with an explicit time source.
    pub fn with_clock(config: SessionConfig, persistence: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                cache: Mutex::new(CacheState::default()),
                persistence,
                clock,
                config,
            }),
        }
    }

    /// Get the store configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Get the durable backend.
    pub fn persistence(&self) -> &P {
        &self.inner.persistence
    }

    /// Number of sessions currently held in memory (expired ones included
    /// until the next cleanup or lookup evicts them).
    pub fn cached_len(&self) -> usize {
        self.inner.cache.lock().sessions.len()
    }

    /// Whether a token is currently held in memory.
    pub fn is_cached(&self, token: &str) -> bool {
        self.inner.cache.lock().sessions.contains_key(token)
    }

    /// Start a session for `user_id`.
    ///
    /// If `request_token` resolves to a live session of the same user, that
    /// session is returned unchanged. Otherwise a new token is minted,
    /// persisted, and cached.
    pub fn start(&self, request_token: Option<&str>, user_id: UserId) -> Result<Session> {
        if let Some(token) = request_token.filter(|t| !t.is_empty())
            && let Some(existing) = self.read(token)?
        {
            if existing.user_id == user_id {
                debug!(
                    token_prefix = %token_prefix(token),
                    user_id,
                    "Reusing live session"
                );
                return Ok(existing);
            }
            debug!(
                token_prefix = %token_prefix(token),
                user_id,
                owner = existing.user_id,
                "Presented session belongs to another user, issuing a new one"
            );
        }

        let session = Session::new(generate_token(), user_id, self.inner.clock.now());
        self.inner.persistence.insert(&session)?;

        let mut cache = self.inner.cache.lock();
        cache
            .sessions
            .insert(session.token.clone(), session.clone());

        info!(
            token_prefix = %token_prefix(&session.token),
            user_id,
            cache_size = cache.sessions.len(),
            "Session started"
        );

        Ok(session)
    }

    /// Look up an active session.
    ///
    /// Returns `Ok(None)` when the token is unknown, expired, or destroyed.
    /// Errors are reserved for durable-store failures.
    pub fn read(&self, token: &str) -> Result<Option<Session>> {
        let now = self.inner.clock.now();
        let max_life = self.inner.config.max_life();

        let invalidations = {
            let mut cache = self.inner.cache.lock();
            match cache.sessions.get(token) {
                Some(session) if session.is_active_at(now, max_life) => {
                    trace!(token_prefix = %token_prefix(token), "Session found in cache");
                    return Ok(Some(session.clone()));
                }
                Some(_) => {
                    debug!(token_prefix = %token_prefix(token), "Cached session expired, evicting");
                    cache.sessions.remove(token);
                }
                None => {}
            }
            cache.invalidations
        };

        debug!(token_prefix = %token_prefix(token), "Session cache miss, consulting storage");

        let found = self
            .inner
            .persistence
            .find_active(token, max_life, now)?
            .filter(|s| s.is_active_at(now, max_life));

        let Some(session) = found else {
            return Ok(None);
        };

        if self.inner.config.repopulate_on_fallback {
            let mut cache = self.inner.cache.lock();
            if cache.invalidations == invalidations {
                cache
                    .sessions
                    .insert(session.token.clone(), session.clone());
                debug!(
                    token_prefix = %token_prefix(token),
                    cache_size = cache.sessions.len(),
                    "Session loaded from storage into cache"
                );
            }
        }

        Ok(Some(session))
    }

    /// Like [`read`](Self::read), but a missing session is an error.
    pub fn require(&self, token: &str) -> Result<Session> {
        self.read(token)?.ok_or(SessionError::NotFound)
    }

    /// Destroy a session in both tiers.
    ///
    /// Unknown tokens are a no-op on the cache side. Storage failures are
    /// returned to the caller without retry.
    pub fn destroy(&self, token: &str) -> Result<()> {
        self.invalidate(token);
        let deleted = self.inner.persistence.delete(token);
        // A fallback read may have re-cached the row while the delete was in flight.
        self.invalidate(token);

        deleted?;
        info!(token_prefix = %token_prefix(token), "Session destroyed");
        Ok(())
    }

    /// Time left before `session` expires, zero once it has.
    pub fn remaining_life(&self, session: &Session) -> std::time::Duration {
        let max_life = self.inner.config.max_life();
        (session.expires_at(max_life) - self.inner.clock.now())
            .to_std()
            .unwrap_or_default()
    }

    fn invalidate(&self, token: &str) {
        let mut cache = self.inner.cache.lock();
        cache.sessions.remove(token);
        cache.invalidations = cache.invalidations.wrapping_add(1);
    }

    /// Run one cleanup pass.
    ///
    /// Evicts expired entries from the cache and deletes every session issued
    /// before `now - max_life_time` from storage. Returns the number of rows
    /// removed from storage.
    pub fn cleanup_now(&self) -> Result<usize> {
        let now = self.inner.clock.now();
        let max_life = self.inner.config.max_life();
        let cutoff = now
            .checked_sub_signed(max_life)
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC);

        let evicted = {
            let mut cache = self.inner.cache.lock();
            let before = cache.sessions.len();
            cache.sessions.retain(|_, s| s.is_active_at(now, max_life));
            before - cache.sessions.len()
        };

        let removed = self.inner.persistence.delete_expired_before(cutoff)?;

        if evicted > 0 || removed > 0 {
            info!(%cutoff, evicted, removed, "Cleaned up expired sessions");
        } else {
            debug!(%cutoff, "No expired sessions to clean up");
        }

        Ok(removed)
    }
}

impl<P: SessionPersistence> Clone for SessionStore<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::persistence::MemoryPersistence;
    use chrono::{TimeDelta, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    /// Backend that counts lookups and can be told to fail.
    #[derive(Default)]
    struct CountingPersistence {
        inner: MemoryPersistence,
        finds: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
    }

    impl CountingPersistence {
        fn check(&self) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                Err(SessionError::Persistence("database unavailable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl SessionPersistence for CountingPersistence {
        fn insert(&self, session: &Session) -> Result<()> {
            self.check()?;
            self.inner.insert(session)
        }

        fn find_active(
            &self,
            token: &str,
            max_life: TimeDelta,
            now: chrono::DateTime<Utc>,
        ) -> Result<Option<Session>> {
            self.check()?;
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find_active(token, max_life, now)
        }

        fn delete(&self, token: &str) -> Result<()> {
            self.check()?;
            self.inner.delete(token)
        }

        fn delete_expired_before(&self, cutoff: chrono::DateTime<Utc>) -> Result<usize> {
            self.check()?;
            self.inner.delete_expired_before(cutoff)
        }
    }

    /// Backend whose first `delete` reports entry and then waits to be released.
    struct GatedDelete {
        inner: MemoryPersistence,
        entered: Mutex<Option<mpsc::Sender<()>>>,
        release: Mutex<Option<mpsc::Receiver<()>>>,
    }

    impl SessionPersistence for GatedDelete {
        fn insert(&self, session: &Session) -> Result<()> {
            self.inner.insert(session)
        }

        fn find_active(
            &self,
            token: &str,
            max_life: TimeDelta,
            now: chrono::DateTime<Utc>,
        ) -> Result<Option<Session>> {
            self.inner.find_active(token, max_life, now)
        }

        fn delete(&self, token: &str) -> Result<()> {
            if let Some(entered) = self.entered.lock().take() {
                entered.send(()).unwrap();
            }
            let release = self.release.lock().take();
            if let Some(release) = release {
                release.recv().unwrap();
            }
            self.inner.delete(token)
        }

        fn delete_expired_before(&self, cutoff: chrono::DateTime<Utc>) -> Result<usize> {
            self.inner.delete_expired_before(cutoff)
        }
    }

    fn store_with_clock(
        config: SessionConfig,
    ) -> (
        SessionStore<Arc<CountingPersistence>>,
        Arc<CountingPersistence>,
        Arc<ManualClock>,
    ) {
        let backend = Arc::new(CountingPersistence::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = SessionStore::with_clock(config, Arc::clone(&backend), clock.clone());
        (store, backend, clock)
    }

    fn minute_config() -> SessionConfig {
        SessionConfig::new().with_max_life_time(Duration::from_secs(60))
    }

    #[test]
    fn test_start_and_read() {
        let (store, backend, _clock) = store_with_clock(minute_config());

        let session = store.start(None, 42).unwrap();
        assert_eq!(session.user_id, 42);
        assert_eq!(backend.inner.len(), 1);

        let read = store.read(&session.token).unwrap();
        assert_eq!(read, Some(session));
        // Served from cache
        assert_eq!(backend.finds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_start_is_idempotent_for_live_session() {
        let (store, backend, _clock) = store_with_clock(minute_config());

        let first = store.start(None, 42).unwrap();
        let second = store.start(Some(&first.token), 42).unwrap();
        let third = store.start(Some(&second.token), 42).unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(backend.inner.len(), 1);
    }

    #[test]
    fn test_start_with_expired_token_mints_new() {
        let (store, _backend, clock) = store_with_clock(minute_config());

        let first = store.start(None, 42).unwrap();
        clock.advance(TimeDelta::seconds(60));
        let second = store.start(Some(&first.token), 42).unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(second.login_time, clock.now());
    }

    #[test]
    fn test_start_with_other_users_token_mints_new() {
        let (store, _backend, _clock) = store_with_clock(minute_config());

        let alice = store.start(None, 1).unwrap();
        let bob = store.start(Some(&alice.token), 2).unwrap();

        assert_ne!(alice.token, bob.token);
        assert_eq!(bob.user_id, 2);
    }

    #[test]
    fn test_start_with_unknown_token_mints_new() {
        let (store, _backend, _clock) = store_with_clock(minute_config());
        let session = store.start(Some("no-such-token"), 9).unwrap();
        assert_ne!(session.token, "no-such-token");
    }

    #[test]
    fn test_read_expires_at_exact_boundary() {
        let (store, _backend, clock) = store_with_clock(minute_config());
        let session = store.start(None, 1).unwrap();

        clock.advance(TimeDelta::seconds(59));
        assert!(store.read(&session.token).unwrap().is_some());

        clock.set(session.login_time + TimeDelta::seconds(60));
        assert!(store.read(&session.token).unwrap().is_none());
        // Expired entry evicted from the cache
        assert!(!store.is_cached(&session.token));
    }

    #[test]
    fn test_destroy_then_read_is_not_found() {
        let (store, backend, _clock) = store_with_clock(minute_config());
        let session = store.start(None, 1).unwrap();

        store.destroy(&session.token).unwrap();

        assert!(store.read(&session.token).unwrap().is_none());
        assert!(matches!(
            store.require(&session.token),
            Err(SessionError::NotFound)
        ));
        assert!(backend.inner.is_empty());
    }

    #[test]
    fn test_destroy_unknown_token_is_noop() {
        let (store, _backend, _clock) = store_with_clock(minute_config());
        store.destroy("never-issued").unwrap();
    }

    #[test]
    fn test_destroy_propagates_persistence_error() {
        let (store, backend, _clock) = store_with_clock(minute_config());
        let session = store.start(None, 1).unwrap();

        backend.fail.store(true, Ordering::SeqCst);
        let result = store.destroy(&session.token);
        assert!(matches!(result, Err(SessionError::Persistence(_))));
        // Cache side is already gone
        assert!(!store.is_cached(&session.token));
    }

    #[test]
    fn test_read_during_destroy_does_not_resurrect_session() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let backend = Arc::new(GatedDelete {
            inner: MemoryPersistence::new(),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
        });
        let store = SessionStore::new(minute_config(), Arc::clone(&backend));
        let session = store.start(None, 1).unwrap();

        let destroyer = {
            let store = store.clone();
            let token = session.token.clone();
            std::thread::spawn(move || store.destroy(&token))
        };

        // Row is still in storage, so this read may put it back in the cache
        entered_rx.recv().unwrap();
        assert!(store.read(&session.token).unwrap().is_some());

        release_tx.send(()).unwrap();
        destroyer.join().unwrap().unwrap();

        assert!(!store.is_cached(&session.token));
        assert!(store.read(&session.token).unwrap().is_none());
        assert!(backend.inner.is_empty());
    }

    #[test]
    fn test_remaining_life_counts_down_to_zero() {
        let (store, _backend, clock) = store_with_clock(minute_config());
        let session = store.start(None, 1).unwrap();

        assert_eq!(store.remaining_life(&session), Duration::from_secs(60));
        clock.advance(TimeDelta::seconds(45));
        assert_eq!(store.remaining_life(&session), Duration::from_secs(15));
        clock.advance(TimeDelta::seconds(30));
        assert_eq!(store.remaining_life(&session), Duration::ZERO);
    }

    #[test]
    fn test_fallback_hit_repopulates_cache() {
        let (store, backend, _clock) = store_with_clock(minute_config());

        // Issued by another process: only in storage
        let session = Session::new("durable-token", 5, Utc::now());
        backend.inner.insert(&session).unwrap();

        assert!(store.read("durable-token").unwrap().is_some());
        assert!(store.read("durable-token").unwrap().is_some());
        assert_eq!(backend.finds.load(Ordering::SeqCst), 1);
        assert!(store.is_cached("durable-token"));
    }

    #[test]
    fn test_fallback_without_repopulation() {
        let (store, backend, _clock) =
            store_with_clock(minute_config().with_repopulate_on_fallback(false));

        let session = Session::new("durable-token", 5, Utc::now());
        backend.inner.insert(&session).unwrap();

        assert!(store.read("durable-token").unwrap().is_some());
        assert!(store.read("durable-token").unwrap().is_some());
        assert_eq!(backend.finds.load(Ordering::SeqCst), 2);
        assert!(!store.is_cached("durable-token"));
    }

    #[test]
    fn test_fallback_rejects_expired_storage_rows() {
        let (store, backend, clock) = store_with_clock(minute_config());

        let session = Session::new("old-token", 5, clock.now() - TimeDelta::seconds(60));
        backend.inner.insert(&session).unwrap();

        assert!(store.read("old-token").unwrap().is_none());
    }

    #[test]
    fn test_read_propagates_persistence_error_on_miss() {
        let (store, backend, _clock) = store_with_clock(minute_config());
        backend.fail.store(true, Ordering::SeqCst);

        assert!(matches!(
            store.read("anything"),
            Err(SessionError::Persistence(_))
        ));
    }

    #[test]
    fn test_cleanup_now_purges_both_tiers() {
        let (store, backend, clock) = store_with_clock(minute_config());

        let old = store.start(None, 1).unwrap();
        clock.advance(TimeDelta::seconds(90));
        let fresh = store.start(None, 2).unwrap();

        let removed = store.cleanup_now().unwrap();

        assert_eq!(removed, 1);
        assert_eq!(backend.inner.len(), 1);
        assert!(!store.is_cached(&old.token));
        assert!(store.is_cached(&fresh.token));
        assert_eq!(store.cached_len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let (store, _backend, _clock) = store_with_clock(minute_config());
        let other = store.clone();

        let session = store.start(None, 3).unwrap();
        assert!(other.is_cached(&session.token));

        other.destroy(&session.token).unwrap();
        assert!(store.read(&session.token).unwrap().is_none());
    }

    #[test]
    fn test_concurrent_start_and_read() {
        let store = SessionStore::new(minute_config(), MemoryPersistence::new());

        let handles: Vec<_> = (0..8)
            .map(|user| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let session = store.start(None, user).unwrap();
                        assert!(store.read(&session.token).unwrap().is_some());
                        store.destroy(&session.token).unwrap();
                        assert!(store.read(&session.token).unwrap().is_none());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.cached_len(), 0);
        assert!(store.persistence().is_empty());
    }
}
