//! # Session Store
//!
//! Live sessions keyed by user id. Each session sits behind its own async
//! mutex so that every event for a given user is applied one at a time,
//! while different users proceed independently.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::session::Session;
use crate::UserId;

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the live session of `user`, if any.
    ///
    /// A session that turned terminal while we waited for its lock has
    /// already been purged and is reported as absent.
    pub async fn lock(&self, user: UserId) -> Option<OwnedMutexGuard<Session>> {
        let handle = self.sessions.get(&user).map(|entry| Arc::clone(entry.value()))?;
        let guard = handle.lock_owned().await;
        if guard.is_terminal() {
            return None;
        }
        Some(guard)
    }

    /// Lock the session of `user`, inserting one built by `create` when absent
    pub async fn lock_or_insert_with<F>(&self, user: UserId, create: F) -> OwnedMutexGuard<Session>
    where
        F: Fn() -> Session,
    {
        loop {
            let handle = Arc::clone(
                self.sessions
                    .entry(user)
                    .or_insert_with(|| Arc::new(Mutex::new(create())))
                    .value(),
            );
            let guard = Arc::clone(&handle).lock_owned().await;
            if !guard.is_terminal() {
                return guard;
            }
            // Lost a race with a purge; drop the stale entry and retry
            self.sessions
                .remove_if(&user, |_, current| Arc::ptr_eq(current, &handle));
        }
    }

    /// Drop the session of `user` from the live set
    pub fn remove(&self, user: UserId) -> bool {
        let removed = self.sessions.remove(&user).is_some();
        if removed {
            debug!(user_id = %user, "Session removed");
        }
        removed
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.sessions.contains_key(&user)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
