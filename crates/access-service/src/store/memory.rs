//! In-memory session store.
//!
//! Sessions and the meeting-code alias map live behind a single
//! `tokio::sync::RwLock`, which makes the token-and-alias insert and the
//! read-modify-write of `record_attempt` trivially atomic. One lock for the
//! whole store is acceptable at the scale this service targets; reads take
//! the shared side and never block each other.

use super::{SessionStore, StoreError};
use crate::models::{Outcome, Session};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    /// Primary records, keyed by access token.
    sessions: HashMap<String, Session>,

    /// Meeting code -> access token alias index.
    meeting_codes: HashMap<String, String>,
}

/// Session store backed by process memory.
#[derive(Default)]
pub struct InMemorySessionStore {
    inner: RwLock<Inner>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions. Test and readiness helper.
    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if inner.sessions.contains_key(&session.access_token) {
            return Err(StoreError::DuplicateKey("access_token".to_string()));
        }
        if let Some(code) = &session.meeting_code {
            if inner.meeting_codes.contains_key(code) {
                return Err(StoreError::DuplicateKey("meeting_code".to_string()));
            }
        }

        // Both inserts happen under the same write guard, so no reader can
        // observe the token without its alias or vice versa.
        if let Some(code) = &session.meeting_code {
            inner
                .meeting_codes
                .insert(code.clone(), session.access_token.clone());
        }
        inner.sessions.insert(session.access_token.clone(), session);

        Ok(())
    }

    async fn lookup_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(token).cloned())
    }

    async fn lookup_by_meeting_code(&self, code: &str) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.read().await;
        let Some(token) = inner.meeting_codes.get(code) else {
            return Ok(None);
        };
        Ok(inner.sessions.get(token).cloned())
    }

    async fn record_attempt(
        &self,
        token: &str,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<(Session, Outcome), StoreError> {
        let mut inner = self.inner.write().await;
        let session = inner.sessions.get_mut(token).ok_or(StoreError::NotFound)?;

        session.access_attempt_count = session.access_attempt_count.saturating_add(1);
        session.last_accessed_at = Some(now);

        let effective = if outcome == Outcome::Granted
            && !session.security_policy.allow_multiple_attempts
        {
            if session.consumed {
                // A concurrent attempt won the consumption between the
                // caller's policy evaluation and this critical section.
                Outcome::Locked
            } else {
                session.consumed = true;
                Outcome::Granted
            }
        } else {
            outcome
        };

        Ok((session.clone(), effective))
    }

    async fn revoke(&self, token: &str) -> Result<Session, StoreError> {
        let mut inner = self.inner.write().await;
        let session = inner.sessions.get_mut(token).ok_or(StoreError::NotFound)?;
        session.is_active = false;
        Ok(session.clone())
    }
}
