//! Secure access session models.
//!
//! Contains the session record, its security policy, redemption outcome
//! classification, and the request/response types for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum job description length, in characters after trimming.
///
/// Product rule enforced at creation time only; redemption never
/// re-validates payload content.
pub const MIN_JOB_DESCRIPTION_LENGTH: usize = 50;

/// Maximum company/position/name field length (in bytes, after trimming).
pub const MAX_TEXT_FIELD_LENGTH: usize = 255;

/// Default link expiration window in days when the creator does not
/// specify a policy.
pub const DEFAULT_LINK_EXPIRATION_DAYS: i64 = 7;

/// Result classification of a redemption attempt.
///
/// Redemption "failure" is routine traffic, not an exceptional condition:
/// every branch of the access decision is a value here, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Credentials satisfied the session's policy; payload may be released.
    Granted,

    /// The identifier does not resolve to a live session (unknown token,
    /// unknown meeting code, or hard-revoked session).
    Invalid,

    /// The session existed but its expiration window has passed.
    Expired,

    /// The session was valid but is permanently spent (single-use session
    /// already granted once).
    Locked,

    /// The email step is not yet satisfied; the caller should re-prompt.
    /// Not a terminal failure.
    VerificationRequired,

    /// Email matched but the presented verification code did not.
    VerificationFailed,
}

impl Outcome {
    /// Returns the string representation of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Granted => "granted",
            Outcome::Invalid => "invalid",
            Outcome::Expired => "expired",
            Outcome::Locked => "locked",
            Outcome::VerificationRequired => "verification_required",
            Outcome::VerificationFailed => "verification_failed",
        }
    }
}

/// How a redemption identifier should be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// High-entropy opaque access token (primary identifier).
    AccessToken,

    /// Human-typable `xxx-xxxx-xxx` meeting code (secondary identifier).
    MeetingCode,
}

/// Security configuration embedded in a session.
///
/// Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityPolicy {
    /// Candidate must pass the email verification step before redemption
    /// is granted.
    #[serde(default = "default_true")]
    pub require_auth: bool,

    /// Email match alone is insufficient; the verification code must also
    /// match. Only meaningful when `require_auth` is set.
    #[serde(default = "default_true")]
    pub require_verification_code: bool,

    /// When false the session becomes permanently unredeemable after its
    /// first granted outcome.
    #[serde(default)]
    pub allow_multiple_attempts: bool,

    /// Window in days added to creation time to produce `expires_at`.
    /// Any positive integer is accepted.
    #[serde(default = "default_link_expiration_days")]
    pub link_expiration_days: i64,
}

fn default_true() -> bool {
    true
}

fn default_link_expiration_days() -> i64 {
    DEFAULT_LINK_EXPIRATION_DAYS
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        SecurityPolicy {
            require_auth: true,
            require_verification_code: true,
            allow_multiple_attempts: false,
            link_expiration_days: DEFAULT_LINK_EXPIRATION_DAYS,
        }
    }
}

/// Interview payload carried alongside a session.
///
/// Opaque to the access core: never inspected beyond creation-time
/// validation, and released only on a granted redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewPayload {
    /// Candidate display name.
    pub candidate_name: String,

    /// Hiring company name.
    pub company_name: String,

    /// Position being interviewed for.
    pub position: String,

    /// Job description text used to build the interview knowledge base.
    pub job_description: String,

    /// Knowledge base reference handed to the interview experience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base_id: Option<String>,
}

/// A secure access session record.
///
/// Created exactly once at HR setup time; mutated only by redemption
/// attempts (attempt count, last-accessed timestamp, consumption) and by
/// explicit revocation. Never deleted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque high-entropy primary identifier.
    pub access_token: String,

    /// Optional `xxx-xxxx-xxx` secondary identifier aliasing the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_code: Option<String>,

    /// Shared secret delivered out-of-band by email; present only when
    /// the policy requires it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,

    /// Candidate email, compared case-insensitively during verification.
    pub candidate_email: String,

    /// Security configuration for this session.
    pub security_policy: SecurityPolicy,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Expiration timestamp; always strictly after `created_at`.
    pub expires_at: DateTime<Utc>,

    /// Timestamp of the most recent redemption attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<DateTime<Utc>>,

    /// Incremented on every redemption attempt regardless of outcome.
    /// Only ever increases.
    pub access_attempt_count: u32,

    /// Set false to hard-revoke the session out of band.
    pub is_active: bool,

    /// Terminal marker for a single-use session that has been granted once.
    pub consumed: bool,

    /// Interview payload released on granted redemption.
    pub payload: InterviewPayload,
}

/// Credentials presented by a candidate during redemption.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresentedCredentials {
    /// Candidate email, if the email step has been completed.
    pub email: Option<String>,

    /// Verification code, if one was entered.
    pub code: Option<String>,
}

// ============================================================================
// Session Create API Models
// ============================================================================

/// Request to create a secure access session.
///
/// The security block is optional; secure defaults are applied server-side
/// (auth + verification code required, single-use, 7 day expiry).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    /// Candidate display name.
    pub candidate_name: String,

    /// Candidate email; required when the policy requires auth.
    #[serde(default)]
    pub candidate_email: Option<String>,

    /// Hiring company name.
    pub company_name: String,

    /// Position being interviewed for.
    pub position: String,

    /// Job description text; at least 50 characters.
    pub job_description: String,

    /// Optional knowledge base reference.
    #[serde(default)]
    pub knowledge_base_id: Option<String>,

    /// Security configuration; defaults applied when absent.
    #[serde(default)]
    pub security_policy: Option<SecurityPolicy>,

    /// Also generate a human-typable meeting code for this session.
    #[serde(default)]
    pub with_meeting_code: bool,
}

impl CreateSessionRequest {
    /// Validate the request against the resolved security policy.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self, policy: &SecurityPolicy) -> Result<(), &'static str> {
        let company_name = self.company_name.trim();
        if company_name.is_empty() {
            return Err("Company name is required");
        }
        if company_name.len() > MAX_TEXT_FIELD_LENGTH {
            return Err("Company name must be at most 255 characters");
        }

        let position = self.position.trim();
        if position.is_empty() {
            return Err("Position is required");
        }
        if position.len() > MAX_TEXT_FIELD_LENGTH {
            return Err("Position must be at most 255 characters");
        }

        if self.candidate_name.trim().is_empty() {
            return Err("Candidate name is required");
        }

        if self.job_description.trim().chars().count() < MIN_JOB_DESCRIPTION_LENGTH {
            return Err("Job description must be at least 50 characters");
        }

        if policy.require_auth
            && self
                .candidate_email
                .as_deref()
                .map_or(true, |e| e.trim().is_empty())
        {
            return Err("Candidate email is required for secure interviews");
        }

        if policy.link_expiration_days < 1 {
            return Err("Link expiration must be at least 1 day");
        }

        Ok(())
    }
}

/// Response for session creation.
///
/// The verification code appears here and nowhere else; it is delivered to
/// the candidate out-of-band by the creator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    /// The generated access token.
    pub access_token: String,

    /// The generated meeting code, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_code: Option<String>,

    /// The generated verification code, when the policy requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,

    /// Candidate-facing interview link.
    pub interview_url: String,

    /// Candidate-facing meeting link, when a meeting code was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Session Redeem API Models
// ============================================================================

/// Payload released to the candidate on a granted redemption.
///
/// Deliberately excludes the verification code, candidate email and raw
/// policy: only what the interview experience needs to start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewGrant {
    /// Candidate display name.
    pub candidate_name: String,

    /// Hiring company name.
    pub company_name: String,

    /// Position being interviewed for.
    pub position: String,

    /// Knowledge base reference for the interview experience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base_id: Option<String>,

    /// Expiration timestamp of the session.
    pub expires_at: DateTime<Utc>,
}

impl From<&Session> for InterviewGrant {
    fn from(session: &Session) -> Self {
        InterviewGrant {
            candidate_name: session.payload.candidate_name.clone(),
            company_name: session.payload.company_name.clone(),
            position: session.payload.position.clone(),
            knowledge_base_id: session.payload.knowledge_base_id.clone(),
            expires_at: session.expires_at,
        }
    }
}

/// Response for a redemption attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemResponse {
    /// Outcome classification of this attempt.
    pub outcome: Outcome,

    /// Human-readable remediation hint. Generic by design.
    pub message: String,

    /// Interview payload; present only when the outcome is granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview: Option<InterviewGrant>,
}

/// Response for session revocation.
#[derive(Debug, Clone, Serialize)]
pub struct RevokeResponse {
    /// Always "revoked" on success.
    pub status: &'static str,
}

// ============================================================================
// Operational Models
// ============================================================================

/// Readiness check response.
///
/// Returned by the `/ready` endpoint (readiness probe).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Session store status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<&'static str>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn valid_request() -> CreateSessionRequest {
        CreateSessionRequest {
            candidate_name: "Ada Lovelace".to_string(),
            candidate_email: Some("ada@example.com".to_string()),
            company_name: "Acme".to_string(),
            position: "Engineer".to_string(),
            job_description: "Design, build and operate the analytical engine platform end to end"
                .to_string(),
            knowledge_base_id: Some("kb_123".to_string()),
            security_policy: None,
            with_meeting_code: false,
        }
    }

    #[test]
    fn test_validate_accepts_valid_request() {
        let request = valid_request();
        assert!(request.validate(&SecurityPolicy::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_company() {
        let mut request = valid_request();
        request.company_name = "   ".to_string();
        assert!(request.validate(&SecurityPolicy::default()).is_err());
    }

    #[test]
    fn test_validate_rejects_short_job_description() {
        let mut request = valid_request();
        request.job_description = "Too short".to_string();
        let err = request.validate(&SecurityPolicy::default()).unwrap_err();
        assert!(err.contains("50 characters"));
    }

    #[test]
    fn test_validate_job_description_boundary() {
        let mut request = valid_request();
        request.job_description = "x".repeat(MIN_JOB_DESCRIPTION_LENGTH);
        assert!(request.validate(&SecurityPolicy::default()).is_ok());

        request.job_description = "x".repeat(MIN_JOB_DESCRIPTION_LENGTH - 1);
        assert!(request.validate(&SecurityPolicy::default()).is_err());
    }

    #[test]
    fn test_validate_requires_email_when_auth_required() {
        let mut request = valid_request();
        request.candidate_email = None;
        let err = request.validate(&SecurityPolicy::default()).unwrap_err();
        assert!(err.contains("email"));

        request.candidate_email = Some("".to_string());
        assert!(request.validate(&SecurityPolicy::default()).is_err());
    }

    #[test]
    fn test_validate_allows_missing_email_without_auth() {
        let mut request = valid_request();
        request.candidate_email = None;
        let policy = SecurityPolicy {
            require_auth: false,
            ..SecurityPolicy::default()
        };
        assert!(request.validate(&policy).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_expiration() {
        let request = valid_request();
        let policy = SecurityPolicy {
            link_expiration_days: 0,
            ..SecurityPolicy::default()
        };
        assert!(request.validate(&policy).is_err());
    }

    #[test]
    fn test_security_policy_defaults() {
        let policy = SecurityPolicy::default();
        assert!(policy.require_auth);
        assert!(policy.require_verification_code);
        assert!(!policy.allow_multiple_attempts);
        assert_eq!(policy.link_expiration_days, 7);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&Outcome::VerificationRequired).unwrap();
        assert_eq!(json, "\"verification_required\"");
        assert_eq!(Outcome::Locked.as_str(), "locked");
    }

    #[test]
    fn test_redeem_response_omits_absent_interview() {
        let response = RedeemResponse {
            outcome: Outcome::Expired,
            message: "This interview link has expired".to_string(),
            interview: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("\"interview\""));
        assert!(json.contains("\"expired\""));
    }
}
