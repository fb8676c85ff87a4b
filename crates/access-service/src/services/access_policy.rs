//! Access policy evaluation.
//!
//! A pure decision function over a session, the presented credentials and
//! the current time. No I/O, no clock reads, no mutation: the lifecycle
//! controller owns lookup and bookkeeping around it.
//!
//! The check order is user-observable and fixed: revocation, then expiry,
//! then consumption, then the verification steps. Expiry before consumption
//! means an expired-and-consumed session reports expired (the more
//! actionable message) rather than locked.

use crate::models::{Outcome, PresentedCredentials, Session};
use chrono::{DateTime, Utc};

/// Evaluate a redemption attempt against a session's policy.
pub fn evaluate(
    session: &Session,
    presented: &PresentedCredentials,
    now: DateTime<Utc>,
) -> Outcome {
    if !session.is_active {
        return Outcome::Invalid;
    }

    if session.expires_at < now {
        return Outcome::Expired;
    }

    if !session.security_policy.allow_multiple_attempts && session.consumed {
        return Outcome::Locked;
    }

    if session.security_policy.require_auth {
        // Email step first: a mismatch is retryable, the UI re-prompts for
        // email before it ever shows the code field. Case folding is full
        // Unicode lowercasing so internationalized addresses match too.
        let email_matches = presented
            .email
            .as_deref()
            .map(str::trim)
            .is_some_and(|email| {
                email.to_lowercase() == session.candidate_email.to_lowercase()
            });

        if !email_matches {
            return Outcome::VerificationRequired;
        }

        if session.security_policy.require_verification_code {
            let code_matches = match (&presented.code, &session.verification_code) {
                (Some(presented_code), Some(expected)) => {
                    presented_code.trim().to_ascii_uppercase() == *expected
                }
                _ => false,
            };

            if !code_matches {
                return Outcome::VerificationFailed;
            }
        }
    }

    Outcome::Granted
}
