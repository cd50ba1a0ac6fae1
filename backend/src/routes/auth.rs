//! Authentication routes
//!
//! Provides endpoints for registration, login, token refresh and validation.
//!
//! # Performance Optimizations
//!
//! - Uses the pre-computed token authority from AppState
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::json::ApiJson;
use crate::services::UserService;
use crate::state::AppState;
use auth_service_shared::{
    AuthTokens, LoginRequest, RefreshTokenRequest, RegisterRequest, RegisterResponse,
    TokenValidationResponse, UserProfile, ValidateTokenRequest,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/validate", post(validate_token))
        .route("/me", get(get_profile))
}

/// Register a new user
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let response = UserService::register(state.users(), state.passwords(), &req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens = UserService::login(
        state.users(),
        state.passwords(),
        state.tokens(),
        &req.email,
        &req.password,
    )
    .await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new access token
///
/// POST /api/v1/auth/refresh
async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshTokenRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens =
        UserService::refresh_token(state.users(), state.tokens(), &req.refresh_token).await?;
    Ok(Json(tokens))
}

/// Check an access token without failing the request
///
/// POST /api/v1/auth/validate
async fn validate_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ValidateTokenRequest>,
) -> Json<TokenValidationResponse> {
    Json(UserService::validate_token(state.tokens(), &req.token))
}

/// Get current user profile (requires authentication)
///
/// GET /api/v1/auth/me
async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::get_profile(state.users(), auth_user.user_id).await?;
    Ok(Json(profile))
}
