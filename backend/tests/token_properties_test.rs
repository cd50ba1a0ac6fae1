//! Credential and token properties exercised through the public API

mod common;

use auth_service_backend::auth::{
    JwtKeys, ManualClock, PasswordService, TokenAuthority, TokenTtl, ALGORITHM, MIN_COST,
};
use auth_service_shared::{TokenError, TokenKind};
use axum::http::StatusCode;
use chrono::Duration;
use common::{unique_email, TestApp, TEST_SECRET};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn hasher() -> PasswordService {
    PasswordService::new(MIN_COST).unwrap()
}

fn authority() -> TokenAuthority {
    TokenAuthority::new(TEST_SECRET, 3600, 86400).unwrap()
}

fn clocked_authority(clock: Arc<ManualClock>) -> TokenAuthority {
    TokenAuthority::with_clock(
        JwtKeys::new(TEST_SECRET),
        TokenTtl::from_secs(60, 600).unwrap(),
        clock,
    )
}

/// Alter the first character of the signature segment
fn tamper_signature(token: &str) -> String {
    let (head, signature) = token.rsplit_once('.').unwrap();
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    format!("{}.{}", head, chars.into_iter().collect::<String>())
}

#[test]
fn test_end_to_end_scenario() {
    let passwords = hasher();
    let digest = passwords.hash("Secret123!").unwrap();

    assert!(passwords.verify("Secret123!", &digest).unwrap());
    assert!(!passwords.verify("wrong", &digest).unwrap());

    let tokens = authority();
    let access = tokens
        .issue_access_token("user-42", Some("user@example.com"))
        .unwrap();
    let claims = tokens.decode(&access, TokenKind::Access).unwrap();

    assert_eq!(claims.sub, "user-42");
    assert_eq!(claims.email.as_deref(), Some("user@example.com"));
    assert_eq!(
        jsonwebtoken::decode_header(&access).unwrap().alg,
        ALGORITHM
    );
}

#[test]
fn test_salt_freshness() {
    let passwords = hasher();
    let first = passwords.hash("Secret123!").unwrap();
    let second = passwords.hash("Secret123!").unwrap();

    assert_ne!(first, second);
    assert!(passwords.verify("Secret123!", &first).unwrap());
    assert!(passwords.verify("Secret123!", &second).unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_digest_verifies_only_its_plaintext(
        p1 in "[a-zA-Z0-9!@#]{1,40}",
        p2 in "[a-zA-Z0-9!@#]{1,40}",
    ) {
        prop_assume!(p1 != p2);
        let passwords = hasher();
        let digest = passwords.hash(&p1).unwrap();

        prop_assert!(passwords.verify(&p1, &digest).unwrap());
        prop_assert!(!passwords.verify(&p2, &digest).unwrap());
    }
}

#[test]
fn test_access_token_kind_is_checked() {
    let tokens = authority();
    let access = tokens.issue_access_token("user-42", None).unwrap();

    assert!(tokens.decode(&access, TokenKind::Access).is_ok());
    assert_eq!(
        tokens.decode(&access, TokenKind::Refresh).unwrap_err(),
        TokenError::WrongKind {
            expected: TokenKind::Refresh,
            found: TokenKind::Access,
        }
    );
}

#[test]
fn test_negative_ttl_token_is_expired() {
    let tokens = TokenAuthority::new(TEST_SECRET, -1, -1).unwrap();
    let access = tokens.issue_access_token("user-42", None).unwrap();

    assert_eq!(
        tokens.decode(&access, TokenKind::Access).unwrap_err(),
        TokenError::Expired
    );
}

#[test]
fn test_advanced_clock_expires_token() {
    let clock = Arc::new(ManualClock::new());
    let tokens = clocked_authority(clock.clone());
    let access = tokens.issue_access_token("user-42", None).unwrap();

    clock.advance(Duration::seconds(59));
    assert!(tokens.decode(&access, TokenKind::Access).is_ok());

    clock.advance(Duration::seconds(1));
    assert_eq!(
        tokens.decode(&access, TokenKind::Access).unwrap_err(),
        TokenError::Expired
    );
}

#[test]
fn test_tampered_signature_rejected() {
    let tokens = authority();
    let access = tokens.issue_access_token("user-42", None).unwrap();

    assert_eq!(
        tokens
            .decode(&tamper_signature(&access), TokenKind::Access)
            .unwrap_err(),
        TokenError::Signature
    );
}

#[test]
fn test_refresh_semantics() {
    let clock = Arc::new(ManualClock::new());
    let tokens = clocked_authority(clock.clone());

    let refresh = tokens.issue_refresh_token("user-42").unwrap();
    let access = tokens.refresh(&refresh).unwrap();
    let claims = tokens.decode(&access, TokenKind::Access).unwrap();
    assert_eq!(claims.sub, "user-42");
    assert_eq!(claims.kind, TokenKind::Access);

    let used_access = tokens.issue_access_token("user-42", None).unwrap();
    assert!(matches!(
        tokens.refresh(&used_access),
        Err(TokenError::WrongKind { .. })
    ));

    clock.advance(Duration::seconds(600));
    assert_eq!(tokens.refresh(&refresh).unwrap_err(), TokenError::Expired);
}

#[tokio::test]
async fn test_expired_access_token_rejected_over_http() {
    let clock = Arc::new(ManualClock::new());
    let app = TestApp::with_clock(clock.clone());
    let email = unique_email("clock");
    app.register(&email).await;
    let tokens = app.login(&email).await;
    let access = tokens["access_token"].as_str().unwrap();

    let (status, _) = app.get_with_bearer("/api/v1/auth/me", access).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::seconds(3600));
    let (status, _) = app.get_with_bearer("/api/v1/auth/me", access).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Refresh token outlives the access token
    let body = json!({ "refresh_token": tokens["refresh_token"] });
    let (status, response) = app.post("/api/v1/auth/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&response).unwrap();
    let fresh = response["access_token"].as_str().unwrap();
    let (status, _) = app.get_with_bearer("/api/v1/auth/me", fresh).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::seconds(86400));
    let (status, _) = app.post("/api/v1/auth/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
