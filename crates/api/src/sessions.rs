//! In-memory registry of open editing sessions.
//!
//! A session carries the row count and lifecycle phase between requests,
//! the way a form's state survives rebuilds of the same page. Sessions end
//! when they reach `Done`; abandoned ones are evicted once idle for longer
//! than the configured TTL.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{TimeDelta, Utc};
use identity_core::controller::EditorPhase;
use identity_core::row_editor::EditorSession;
use identity_store::Timestamp;
use uuid::Uuid;

use crate::state::lock;

#[derive(Debug)]
struct Entry {
    session: EditorSession,
    last_seen: Timestamp,
}

impl Entry {
    fn is_stale(&self, ttl: TimeDelta, now: Timestamp) -> bool {
        now.signed_duration_since(self.last_seen) > ttl
    }
}

#[derive(Debug)]
pub struct SessionRegistry {
    ttl: TimeDelta,
    sessions: Mutex<HashMap<Uuid, Entry>>,
}

impl SessionRegistry {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a session and return its id.
    pub fn insert(&self, session: EditorSession) -> Uuid {
        self.insert_at(session, Utc::now())
    }

    /// Register a session as of `now`, evicting sessions idle past the TTL.
    pub fn insert_at(&self, session: EditorSession, now: Timestamp) -> Uuid {
        let mut sessions = lock(&self.sessions);

        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_stale(self.ttl, now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle editing sessions");
        }

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            Entry {
                session,
                last_seen: now,
            },
        );
        id
    }

    /// Run `f` against the session with the registry locked.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut EditorSession) -> R) -> Option<R> {
        self.with_session_at(id, Utc::now(), f)
    }

    /// Returns `None` for an unknown or idle-expired id. A session that ends
    /// up `Done` is dropped from the registry.
    pub fn with_session_at<R>(
        &self,
        id: Uuid,
        now: Timestamp,
        f: impl FnOnce(&mut EditorSession) -> R,
    ) -> Option<R> {
        let mut sessions = lock(&self.sessions);
        let entry = sessions.get_mut(&id)?;
        if entry.is_stale(self.ttl, now) {
            sessions.remove(&id);
            tracing::debug!(session_id = %id, "Editing session expired");
            return None;
        }

        entry.last_seen = now;
        let result = f(&mut entry.session);
        if entry.session.phase() == EditorPhase::Done {
            sessions.remove(&id);
            tracing::debug!(session_id = %id, "Editing session completed");
        }
        Some(result)
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
