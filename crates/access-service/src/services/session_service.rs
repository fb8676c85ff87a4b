//! Session lifecycle controller.
//!
//! Orchestrates creation (validate, generate credentials, derive expiry,
//! insert) and redemption (lookup, evaluate policy, record the attempt,
//! surface the effective outcome). All clock values come in as parameters
//! so the lifecycle is fully testable without a real clock.

use crate::errors::AccessError;
use crate::models::{
    CreateSessionRequest, IdentifierKind, InterviewPayload, Outcome, PresentedCredentials, Session,
};
use crate::services::{access_policy, token_generator};
use crate::store::{SessionStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Maximum collision retries for token/meeting-code generation.
///
/// A collision is astronomically unlikely given the token entropy, but the
/// duplicate-key path must be handled, not ignored.
const MAX_GENERATION_RETRIES: usize = 3;

/// How many leading token characters may appear in logs.
const TOKEN_LOG_PREFIX_LEN: usize = 8;

/// The session lifecycle controller.
pub struct SessionService {
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        SessionService { store }
    }

    /// Create a secure access session.
    ///
    /// Validates the request against the resolved security policy,
    /// generates the access token (and meeting code when requested, and
    /// verification code when the policy requires one), computes the
    /// expiry window and inserts the session. Generation is retried on
    /// duplicate keys up to [`MAX_GENERATION_RETRIES`] times.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when validation fails; the store is untouched.
    /// - `ExhaustedRetries` when every generation attempt collided.
    /// - `Store` on storage malfunction.
    #[instrument(skip_all, name = "access.session.create")]
    pub async fn create_session(
        &self,
        request: CreateSessionRequest,
        now: DateTime<Utc>,
    ) -> Result<Session, AccessError> {
        let policy = request.security_policy.clone().unwrap_or_default();

        request
            .validate(&policy)
            .map_err(|e| AccessError::InvalidInput(e.to_string()))?;

        let candidate_email = request
            .candidate_email
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string();

        let verification_code = if policy.require_verification_code {
            Some(token_generator::new_verification_code()?)
        } else {
            None
        };

        // Checked arithmetic: a huge (but positive) window must come back
        // as a validation error, not an overflow panic.
        let expires_at = Duration::try_days(policy.link_expiration_days)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| {
                AccessError::InvalidInput("link_expiration_days is out of range".to_string())
            })?;

        let payload = InterviewPayload {
            candidate_name: request.candidate_name.trim().to_string(),
            company_name: request.company_name.trim().to_string(),
            position: request.position.trim().to_string(),
            job_description: request.job_description.trim().to_string(),
            knowledge_base_id: request.knowledge_base_id.clone(),
        };

        for attempt in 0..MAX_GENERATION_RETRIES {
            let access_token = token_generator::new_access_token()?;
            let meeting_code = if request.with_meeting_code {
                Some(token_generator::new_meeting_code()?)
            } else {
                None
            };

            let session = Session {
                access_token: access_token.clone(),
                meeting_code,
                verification_code: verification_code.clone(),
                candidate_email: candidate_email.clone(),
                security_policy: policy.clone(),
                created_at: now,
                expires_at,
                last_accessed_at: None,
                access_attempt_count: 0,
                is_active: true,
                consumed: false,
                payload: payload.clone(),
            };

            match self.store.create(session.clone()).await {
                Ok(()) => {
                    info!(
                        target: "access.session",
                        token_prefix = token_prefix(&access_token),
                        has_meeting_code = session.meeting_code.is_some(),
                        expires_at = %session.expires_at,
                        "Session created"
                    );
                    return Ok(session);
                }
                Err(StoreError::DuplicateKey(key)) => {
                    // Retry with fresh credentials
                    warn!(
                        target: "access.session",
                        attempt = attempt + 1,
                        key = %key,
                        "Generated credential collided, retrying"
                    );
                }
                Err(e) => return Err(AccessError::Store(e.to_string())),
            }
        }

        Err(AccessError::ExhaustedRetries)
    }

    /// Redeem a session by access token or meeting code.
    ///
    /// An unknown identifier yields `(Invalid, None)` with no further
    /// detail — the caller cannot distinguish a never-issued identifier
    /// from a similarly-shaped near miss. Every attempt against a known
    /// session is recorded regardless of outcome; the session is returned
    /// only when the effective outcome is granted.
    ///
    /// # Errors
    ///
    /// Only storage malfunction surfaces as an error; every access
    /// decision is an [`Outcome`] value.
    #[instrument(skip_all, name = "access.session.redeem")]
    pub async fn redeem(
        &self,
        identifier: &str,
        kind: IdentifierKind,
        presented: &PresentedCredentials,
        now: DateTime<Utc>,
    ) -> Result<(Outcome, Option<Session>), AccessError> {
        let session = match kind {
            IdentifierKind::AccessToken => self.store.lookup_by_token(identifier).await,
            IdentifierKind::MeetingCode => {
                // Fast-reject malformed codes before touching the store
                if !token_generator::is_valid_meeting_code(identifier) {
                    return Ok((Outcome::Invalid, None));
                }
                self.store.lookup_by_meeting_code(identifier).await
            }
        }
        .map_err(|e| AccessError::Store(e.to_string()))?;

        let Some(session) = session else {
            return Ok((Outcome::Invalid, None));
        };

        let outcome = access_policy::evaluate(&session, presented, now);

        // The store resolves the effective outcome inside its critical
        // section: a concurrent attempt may have consumed a single-use
        // session after our evaluation.
        let (session, effective) = match self
            .store
            .record_attempt(&session.access_token, outcome, now)
            .await
        {
            Ok(result) => result,
            Err(StoreError::NotFound) => return Ok((Outcome::Invalid, None)),
            Err(e) => return Err(AccessError::Store(e.to_string())),
        };

        info!(
            target: "access.session",
            token_prefix = token_prefix(&session.access_token),
            outcome = effective.as_str(),
            attempt_count = session.access_attempt_count,
            "Redemption attempt recorded"
        );

        if effective == Outcome::Granted {
            Ok((effective, Some(session)))
        } else {
            Ok((effective, None))
        }
    }

    /// Hard-revoke a session out of band.
    ///
    /// # Errors
    ///
    /// `NotFound` when the token is unknown.
    #[instrument(skip_all, name = "access.session.revoke")]
    pub async fn revoke(&self, token: &str) -> Result<(), AccessError> {
        match self.store.revoke(token).await {
            Ok(session) => {
                info!(
                    target: "access.session",
                    token_prefix = token_prefix(&session.access_token),
                    "Session revoked"
                );
                Ok(())
            }
            Err(StoreError::NotFound) => {
                Err(AccessError::NotFound("Session not found".to_string()))
            }
            Err(e) => Err(AccessError::Store(e.to_string())),
        }
    }
}

/// Loggable token prefix; full tokens never appear in logs.
fn token_prefix(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(TOKEN_LOG_PREFIX_LEN)
        .map_or(token.len(), |(i, _)| i);
    token.get(..end).unwrap_or(token)
}
