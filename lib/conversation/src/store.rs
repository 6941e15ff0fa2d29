//! In-memory session store.
//!
//! Each session sits behind its own async mutex. A turn holds the session's
//! guard from start to finish, so turns for one token run one at a time while
//! turns for different tokens run concurrently.

use crate::session::ConversationSession;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};
use wayfarer_core::SessionToken;

/// Exclusive access to one session for the duration of a turn.
pub type SessionGuard = OwnedMutexGuard<ConversationSession>;

type SessionSlot = Arc<Mutex<ConversationSession>>;

/// Token-keyed store of live sessions.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionToken, SessionSlot>>,
    idle_timeout: TimeDelta,
}

impl SessionStore {
    /// Creates an empty store that expires sessions idle longer than
    /// `idle_timeout`.
    #[must_use]
    pub fn new(idle_timeout: TimeDelta) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Locks the session for `token`, waiting for any in-flight turn on it.
    ///
    /// Returns `None` if no such session exists, including when it was
    /// removed while waiting for the lock.
    pub async fn checkout(&self, token: SessionToken) -> Option<SessionGuard> {
        let slot = self.sessions.read().await.get(&token).cloned()?;
        let guard = slot.clone().lock_owned().await;

        let still_live = self
            .sessions
            .read()
            .await
            .get(&token)
            .is_some_and(|current| Arc::ptr_eq(current, &slot));
        still_live.then_some(guard)
    }

    /// Stores a new session and returns it already locked.
    pub async fn insert(&self, session: ConversationSession) -> SessionGuard {
        let token = session.token();
        let slot = Arc::new(Mutex::new(session));
        let guard = slot.clone().lock_owned().await;
        self.sessions.write().await.insert(token, slot);
        debug!(session = %token, "session created");
        guard
    }

    /// Removes the session for `token`. Returns whether one existed.
    pub async fn remove(&self, token: SessionToken) -> bool {
        let removed = self.sessions.write().await.remove(&token).is_some();
        if removed {
            debug!(session = %token, "session removed");
        }
        removed
    }

    /// Drops sessions idle longer than the timeout at `now`.
    ///
    /// Sessions with a turn in flight are kept regardless of age.
    pub async fn purge_idle(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, slot| match slot.try_lock() {
            Ok(session) => !session.is_idle(now, self.idle_timeout),
            Err(_) => true,
        });
        let purged = before - sessions.len();
        if purged > 0 {
            info!(purged, remaining = sessions.len(), "purged idle sessions");
        }
        purged
    }

    /// Returns the number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store() -> SessionStore {
        SessionStore::new(TimeDelta::minutes(60))
    }

    #[tokio::test]
    async fn insert_then_checkout() {
        let store = store();
        let session = ConversationSession::open("tapas", 3000).unwrap();
        let token = session.token();

        drop(store.insert(session).await);

        let guard = store.checkout(token).await.expect("session exists");
        assert_eq!(guard.token(), token);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_token_has_no_session() {
        assert!(store().checkout(SessionToken::new()).await.is_none());
    }

    #[tokio::test]
    async fn remove_session() {
        let store = store();
        let session = ConversationSession::open("tapas", 3000).unwrap();
        let token = session.token();
        drop(store.insert(session).await);

        assert!(store.remove(token).await);
        assert!(!store.remove(token).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn turns_on_one_session_are_serialized() {
        let store = Arc::new(store());
        let session = ConversationSession::open("tapas", 3000).unwrap();
        let token = session.token();
        let first = store.insert(session).await;

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.checkout(token).await.map(|g| g.retry_count()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        assert_eq!(waiter.await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn checkout_after_concurrent_removal_is_none() {
        let store = Arc::new(store());
        let session = ConversationSession::open("tapas", 3000).unwrap();
        let token = session.token();
        let held = store.insert(session).await;

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.checkout(token).await.is_some() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.remove(token).await;
        drop(held);

        assert!(!waiter.await.unwrap());
    }

    #[tokio::test]
    async fn purge_skips_busy_sessions() {
        let store = store();
        let idle = ConversationSession::open("idle", 3000).unwrap();
        let busy = ConversationSession::open("busy", 3000).unwrap();
        let busy_token = busy.token();

        drop(store.insert(idle).await);
        let busy_guard = store.insert(busy).await;

        let later = Utc::now() + TimeDelta::minutes(61);
        assert_eq!(store.purge_idle(later).await, 1);
        assert_eq!(store.len().await, 1);

        drop(busy_guard);
        assert!(store.checkout(busy_token).await.is_some());
    }

    #[tokio::test]
    async fn purge_keeps_recent_sessions() {
        let store = store();
        drop(
            store
                .insert(ConversationSession::open("tapas", 3000).unwrap())
                .await,
        );

        assert_eq!(store.purge_idle(Utc::now()).await, 0);
        assert_eq!(store.len().await, 1);
    }
}
