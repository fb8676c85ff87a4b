//! Service-level lifecycle scenarios with explicit clocks.
//!
//! The lifecycle controller takes `now` as a parameter, so these tests
//! walk sessions through their whole life (creation, redemption days
//! later, expiry) without sleeping or mocking a clock.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use access_service::models::{
    CreateSessionRequest, IdentifierKind, Outcome, PresentedCredentials, SecurityPolicy,
};
use access_service::services::SessionService;
use access_service::store::{InMemorySessionStore, SessionStore};
use chrono::{Duration, Utc};
use std::sync::Arc;

fn service() -> SessionService {
    SessionService::new(Arc::new(InMemorySessionStore::new()) as Arc<dyn SessionStore>)
}

fn request(policy: SecurityPolicy) -> CreateSessionRequest {
    CreateSessionRequest {
        candidate_name: "Grace Hopper".to_string(),
        candidate_email: Some("a@b.com".to_string()),
        company_name: "Acme".to_string(),
        position: "Engineer".to_string(),
        job_description: "Own the compiler backlog and keep the nanoseconds honest every day"
            .to_string(),
        knowledge_base_id: Some("kb_acme_engineer".to_string()),
        security_policy: Some(policy),
        with_meeting_code: false,
    }
}

#[tokio::test]
async fn test_full_single_use_lifecycle() {
    let service = service();
    let t = Utc::now();

    let policy = SecurityPolicy {
        require_auth: true,
        require_verification_code: true,
        allow_multiple_attempts: false,
        link_expiration_days: 7,
    };
    let created = service.create_session(request(policy), t).await.unwrap();

    assert_eq!(created.expires_at, t + Duration::days(7));
    let verification_code = created.verification_code.clone().unwrap();

    // Day 1: case-different email and correct code is granted
    let presented = PresentedCredentials {
        email: Some("A@B.com".to_string()),
        code: Some(verification_code.clone()),
    };
    let (outcome, session) = service
        .redeem(
            &created.access_token,
            IdentifierKind::AccessToken,
            &presented,
            t + Duration::days(1),
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Granted);
    assert!(session.is_some());

    // Day 2: same credentials, session is spent
    let (outcome, session) = service
        .redeem(
            &created.access_token,
            IdentifierKind::AccessToken,
            &presented,
            t + Duration::days(2),
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Locked);
    assert!(session.is_none());

    // A never-created token is invalid, not locked
    let (outcome, session) = service
        .redeem(
            &"0".repeat(64),
            IdentifierKind::AccessToken,
            &presented,
            t + Duration::days(2),
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Invalid);
    assert!(session.is_none());
}

#[tokio::test]
async fn test_email_match_alone_grants_when_code_not_required() {
    let service = service();
    let t = Utc::now();

    let policy = SecurityPolicy {
        require_auth: true,
        require_verification_code: false,
        allow_multiple_attempts: false,
        link_expiration_days: 7,
    };
    let created = service.create_session(request(policy), t).await.unwrap();
    assert!(created.verification_code.is_none());

    let (outcome, _) = service
        .redeem(
            &created.access_token,
            IdentifierKind::AccessToken,
            &PresentedCredentials {
                email: Some("a@b.com".to_string()),
                code: None,
            },
            t,
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Granted);
}

#[tokio::test]
async fn test_expired_session_never_grants() {
    let service = service();
    let t = Utc::now();

    let created = service
        .create_session(request(SecurityPolicy::default()), t)
        .await
        .unwrap();

    // Fully correct credentials, but eight days later
    let (outcome, session) = service
        .redeem(
            &created.access_token,
            IdentifierKind::AccessToken,
            &PresentedCredentials {
                email: Some("a@b.com".to_string()),
                code: created.verification_code.clone(),
            },
            t + Duration::days(8),
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Expired);
    assert!(session.is_none());
}

#[tokio::test]
async fn test_custom_expiration_window() {
    let service = service();
    let t = Utc::now();

    let policy = SecurityPolicy {
        link_expiration_days: 30,
        ..SecurityPolicy::default()
    };
    let created = service.create_session(request(policy), t).await.unwrap();
    assert_eq!(created.expires_at, t + Duration::days(30));

    let presented = PresentedCredentials {
        email: Some("a@b.com".to_string()),
        code: created.verification_code.clone(),
    };

    let (outcome, _) = service
        .redeem(
            &created.access_token,
            IdentifierKind::AccessToken,
            &presented,
            t + Duration::days(29),
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Granted);
}

#[tokio::test]
async fn test_verification_steps_are_ordered() {
    let service = service();
    let t = Utc::now();
    let created = service
        .create_session(request(SecurityPolicy::default()), t)
        .await
        .unwrap();

    // Mismatched email: retryable email step, even with a wrong code
    let (outcome, _) = service
        .redeem(
            &created.access_token,
            IdentifierKind::AccessToken,
            &PresentedCredentials {
                email: Some("someone@else.com".to_string()),
                code: Some("WRONG1".to_string()),
            },
            t,
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::VerificationRequired);

    // Matching email, wrong code: terminal-for-this-attempt code failure
    let (outcome, _) = service
        .redeem(
            &created.access_token,
            IdentifierKind::AccessToken,
            &PresentedCredentials {
                email: Some("a@b.com".to_string()),
                code: Some("WRONG1".to_string()),
            },
            t,
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::VerificationFailed);
}

#[tokio::test]
async fn test_concurrent_single_use_redemption_has_one_winner() {
    let store = Arc::new(InMemorySessionStore::new());
    let service = Arc::new(SessionService::new(
        Arc::clone(&store) as Arc<dyn SessionStore>
    ));
    let t = Utc::now();

    let created = service
        .create_session(request(SecurityPolicy::default()), t)
        .await
        .unwrap();
    let token = created.access_token.clone();
    let code = created.verification_code.clone();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let service = Arc::clone(&service);
        let token = token.clone();
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            let presented = PresentedCredentials {
                email: Some("a@b.com".to_string()),
                code,
            };
            service
                .redeem(&token, IdentifierKind::AccessToken, &presented, Utc::now())
                .await
                .map(|(outcome, _)| outcome)
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap().unwrap());
    }
    outcomes.sort_by_key(|o| o.as_str());

    // Exactly one granted, the other locked
    assert_eq!(outcomes, vec![Outcome::Granted, Outcome::Locked]);

    let session = store.lookup_by_token(&token).await.unwrap().unwrap();
    assert_eq!(session.access_attempt_count, 2);
    assert!(session.consumed);
}

#[tokio::test]
async fn test_attempt_count_only_increases() {
    let service = service();
    let t = Utc::now();
    let policy = SecurityPolicy {
        allow_multiple_attempts: true,
        ..SecurityPolicy::default()
    };
    let created = service.create_session(request(policy), t).await.unwrap();

    let presented = PresentedCredentials {
        email: Some("a@b.com".to_string()),
        code: created.verification_code.clone(),
    };

    let mut last_count = 0;
    for day in 0..5 {
        let (outcome, session) = service
            .redeem(
                &created.access_token,
                IdentifierKind::AccessToken,
                &presented,
                t + Duration::days(day),
            )
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Granted);
        let count = session.unwrap().access_attempt_count;
        assert!(count > last_count);
        last_count = count;
    }
    assert_eq!(last_count, 5);
}
