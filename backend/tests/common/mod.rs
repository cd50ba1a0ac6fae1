//! Common test utilities for integration tests
//!
//! Every TestApp runs on its own in-memory user store, so tests never share
//! state and need no external services.

#![allow(dead_code)]

use auth_service_backend::{
    auth::{JwtKeys, ManualClock, TokenAuthority, TokenTtl, MIN_COST},
    config::AppConfig,
    repositories::InMemoryUserRepository,
    routes,
    state::AppState,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";
pub const TEST_PASSWORD: &str = "SecurePass123!";

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application on the system clock
    pub fn new() -> Self {
        let state = AppState::new(test_config()).expect("test state");
        Self::from_state(state)
    }

    /// Create a test application whose tokens read time from `clock`
    pub fn with_clock(clock: Arc<ManualClock>) -> Self {
        let config = test_config();
        let tokens = TokenAuthority::with_clock(
            JwtKeys::new(&config.jwt.secret),
            TokenTtl::from_secs(
                config.jwt.access_token_expiry_secs,
                config.jwt.refresh_token_expiry_secs,
            )
            .expect("test ttl"),
            clock,
        );
        let state = AppState::from_parts(config, tokens, Arc::new(InMemoryUserRepository::new()))
            .expect("test state");
        Self::from_state(state)
    }

    fn from_state(state: AppState) -> Self {
        let app = routes::create_router(state.clone());
        Self { app, state }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a GET request with `Authorization: Bearer <token>`
    pub async fn get_with_bearer(&self, path: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a PUT request with JSON body and `Authorization: Bearer <token>`
    pub async fn put_with_bearer(&self, path: &str, token: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    /// Register a user with [`TEST_PASSWORD`] and return the response body
    pub async fn register(&self, email: &str) -> Value {
        let (status, body) = self
            .post("/api/v1/auth/register", &registration_body(email).to_string())
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        serde_json::from_str(&body).unwrap()
    }

    /// Log in with [`TEST_PASSWORD`] and return the token response
    pub async fn login(&self, email: &str) -> Value {
        let body = json!({ "email": email, "password": TEST_PASSWORD });
        let (status, body) = self.post("/api/v1/auth/login", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        serde_json::from_str(&body).unwrap()
    }
}

pub fn registration_body(email: &str) -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": email,
        "password": TEST_PASSWORD,
        "password_confirmation": TEST_PASSWORD,
    })
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.jwt.secret = TEST_SECRET.to_string();
    config.jwt.access_token_expiry_secs = 3600;
    config.jwt.refresh_token_expiry_secs = 86400;
    config.security.bcrypt_cost = MIN_COST;
    config
}
