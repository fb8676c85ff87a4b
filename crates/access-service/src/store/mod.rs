//! Session store abstraction.
//!
//! The store is the single authoritative home of session state. Callers
//! obtain a store instance through [`SessionStore`]; there is no ambient
//! module-level state. The trait keeps the access core independent of the
//! backing technology, but the atomicity contract on [`SessionStore::create`]
//! and [`SessionStore::record_attempt`] binds every implementation.

mod memory;

pub use memory::InMemorySessionStore;

use crate::models::{Outcome, Session};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Store-layer errors.
///
/// Distinct from [`crate::errors::AccessError`]: `DuplicateKey` and
/// `NotFound` are expected conditions the lifecycle controller handles,
/// while `Unavailable` is a genuine malfunction that propagates.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Session not found")]
    NotFound,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed repository mapping an access token (and, secondarily, a meeting
/// code) to one session record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session.
    ///
    /// The token record and the meeting-code alias (when present) are
    /// inserted atomically: no concurrent reader observes one without the
    /// other.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` if the access token or meeting code already exists.
    async fn create(&self, session: Session) -> Result<(), StoreError>;

    /// Look up a session by access token. Absence is `Ok(None)`, never an
    /// error.
    async fn lookup_by_token(&self, token: &str) -> Result<Option<Session>, StoreError>;

    /// Look up a session by meeting code. Absence is `Ok(None)`, never an
    /// error.
    async fn lookup_by_meeting_code(&self, code: &str) -> Result<Option<Session>, StoreError>;

    /// Record a redemption attempt and resolve its effective outcome.
    ///
    /// Atomically increments `access_attempt_count` and sets
    /// `last_accessed_at`. When `outcome` is granted on a single-use
    /// session, the same atomic step either marks the session consumed
    /// (outcome stays granted) or, if another attempt already consumed it,
    /// downgrades the outcome to locked. Two simultaneous redemptions of a
    /// single-use session therefore never both observe granted.
    ///
    /// Returns the updated session and the effective outcome.
    ///
    /// # Errors
    ///
    /// `NotFound` if the token is unknown.
    async fn record_attempt(
        &self,
        token: &str,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<(Session, Outcome), StoreError>;

    /// Hard-revoke a session out of band (`is_active := false`).
    ///
    /// # Errors
    ///
    /// `NotFound` if the token is unknown.
    async fn revoke(&self, token: &str) -> Result<Session, StoreError>;
}
