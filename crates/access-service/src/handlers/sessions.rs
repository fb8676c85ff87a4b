//! Session handlers.
//!
//! Implements the session endpoints:
//!
//! - `POST /api/v1/sessions` - Create a secure access session (HR side)
//! - `POST /api/v1/sessions/{identifier}/redeem` - Redeem by token or meeting code
//! - `POST /api/v1/sessions/{token}/revoke` - Hard-revoke a session
//!
//! # Security
//!
//! - The verification code appears only in the creation response; it is
//!   never logged and never returned on any other path.
//! - Redemption responses are uniform for unknown, malformed and
//!   near-miss identifiers (all invalid), and release payload only on a
//!   granted outcome.
//! - Error messages are generic to prevent information leakage.

use crate::errors::AccessError;
use crate::models::{
    CreateSessionRequest, CreateSessionResponse, IdentifierKind, Outcome, PresentedCredentials,
    RedeemResponse, RevokeResponse,
};
use crate::observability::metrics;
use crate::routes::AppState;
use crate::services::token_generator::is_valid_meeting_code;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

// ============================================================================
// Handler: POST /api/v1/sessions
// ============================================================================

/// Handler for POST /api/v1/sessions
///
/// Create a secure access session for a candidate interview.
///
/// # Response
///
/// - 201 Created: session created; body carries the access token, the
///   meeting and verification codes (when applicable) and the links to
///   hand to the candidate
/// - 400 Bad Request: invalid request body or failed validation
/// - 500 Internal Server Error: credential collision retries exhausted or
///   storage failure
#[instrument(
    skip_all,
    name = "access.sessions.create",
    fields(
        method = "POST",
        endpoint = "/api/v1/sessions",
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AccessError> {
    let start = Instant::now();

    // Deserialize request body manually to return 400 (not Axum's default 422)
    let request: CreateSessionRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "access.handlers.sessions", error = %e, "Invalid request body");
        let duration = start.elapsed();
        metrics::record_session_creation("error", Some("bad_request"), duration);
        AccessError::BadRequest("Invalid request body".to_string())
    })?;

    let session = state
        .sessions
        .create_session(request, Utc::now())
        .await
        .map_err(|e| {
            let duration = start.elapsed();
            let reason = match &e {
                AccessError::InvalidInput(_) => "invalid_input",
                AccessError::ExhaustedRetries => "collision",
                _ => "internal",
            };
            metrics::record_session_creation("error", Some(reason), duration);
            e
        })?;

    let duration = start.elapsed();
    metrics::record_session_creation("success", None, duration);

    let interview_url = format!(
        "{}/interview/{}",
        state.config.public_base_url, session.access_token
    );
    let meeting_url = session
        .meeting_code
        .as_ref()
        .map(|code| format!("{}/meet/{}", state.config.public_base_url, code));

    // The verification code is released here and nowhere else; it travels
    // to the candidate out-of-band.
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            access_token: session.access_token,
            meeting_code: session.meeting_code,
            verification_code: session.verification_code,
            interview_url,
            meeting_url,
            expires_at: session.expires_at,
        }),
    ))
}

// ============================================================================
// Handler: POST /api/v1/sessions/{identifier}/redeem
// ============================================================================

/// Handler for POST /api/v1/sessions/{identifier}/redeem
///
/// Redeem a session. The identifier is either an access token (from the
/// interview link) or a human-typed meeting code; the meeting code grammar
/// is the discriminator. The body optionally carries the presented email
/// and verification code.
///
/// # Response
///
/// - 200 OK: granted; body carries the interview payload
/// - 401 Unauthorized: verification required or failed (re-promptable)
/// - 403 Forbidden: session is spent (single-use, already granted)
/// - 404 Not Found: unknown or revoked identifier
/// - 410 Gone: session expired
#[instrument(
    skip_all,
    name = "access.sessions.redeem",
    fields(
        method = "POST",
        endpoint = "/api/v1/sessions/{identifier}/redeem",
    )
)]
pub async fn redeem_session(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
    body: axum::body::Bytes,
) -> Result<Response, AccessError> {
    let start = Instant::now();

    // An absent body is an attempt with no credentials, not a bad request
    let presented: PresentedCredentials = if body.is_empty() {
        PresentedCredentials::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(target: "access.handlers.sessions", error = %e, "Invalid request body");
            AccessError::BadRequest("Invalid request body".to_string())
        })?
    };

    let kind = if is_valid_meeting_code(&identifier) {
        IdentifierKind::MeetingCode
    } else {
        IdentifierKind::AccessToken
    };

    let (outcome, session) = state
        .sessions
        .redeem(&identifier, kind, &presented, Utc::now())
        .await?;

    let duration = start.elapsed();
    metrics::record_redemption(outcome.as_str(), duration);

    let status = status_for_outcome(outcome);
    let response = RedeemResponse {
        outcome,
        message: message_for_outcome(outcome).to_string(),
        interview: session.as_ref().map(Into::into),
    };

    Ok((status, Json(response)).into_response())
}

// ============================================================================
// Handler: POST /api/v1/sessions/{token}/revoke
// ============================================================================

/// Handler for POST /api/v1/sessions/{token}/revoke
///
/// Hard-revoke a session out of band. Subsequent redemption attempts
/// resolve to invalid.
///
/// # Response
///
/// - 200 OK: session revoked
/// - 404 Not Found: unknown token
#[instrument(
    skip_all,
    name = "access.sessions.revoke",
    fields(
        method = "POST",
        endpoint = "/api/v1/sessions/{token}/revoke",
    )
)]
pub async fn revoke_session(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<RevokeResponse>, AccessError> {
    state.sessions.revoke(&token).await?;
    Ok(Json(RevokeResponse { status: "revoked" }))
}

/// Map an outcome to its HTTP status.
///
/// Locked is deliberately distinct from invalid (403 vs 404): the two
/// carry different remediation advice.
fn status_for_outcome(outcome: Outcome) -> StatusCode {
    match outcome {
        Outcome::Granted => StatusCode::OK,
        Outcome::Invalid => StatusCode::NOT_FOUND,
        Outcome::Expired => StatusCode::GONE,
        Outcome::Locked => StatusCode::FORBIDDEN,
        Outcome::VerificationRequired | Outcome::VerificationFailed => StatusCode::UNAUTHORIZED,
    }
}

/// Candidate-facing remediation message. Generic by design.
fn message_for_outcome(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Granted => "Access granted",
        Outcome::Invalid => "This interview link is invalid",
        Outcome::Expired => "This interview link has expired",
        Outcome::Locked => "This interview session has already been used",
        Outcome::VerificationRequired => "Email verification is required",
        Outcome::VerificationFailed => "The verification code is incorrect",
    }
}
