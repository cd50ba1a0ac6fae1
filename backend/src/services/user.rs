//! User service for registration, login and token workflows
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - The token authority is passed by reference (pre-computed keys)

use crate::auth::{PasswordService, TokenAuthority};
use crate::config::BootstrapUserConfig;
use crate::error::ApiError;
use crate::metrics;
use crate::repositories::{NewUser, ProfileUpdate, RepositoryError, UserRecord, UserRepository};
use auth_service_shared::validation::{
    codes, validate_profile_update, validate_registration, ValidationError,
};
use auth_service_shared::{
    mask_email, AuthTokens, RegisterRequest, RegisterResponse, TokenValidationResponse,
    UpdateProfileRequest, UserProfile, UserStatus,
};
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

/// Token type reported to clients
pub const BEARER: &str = "bearer";

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user
    ///
    /// # Performance
    /// Password hashing is offloaded to blocking thread pool via `spawn_blocking`.
    pub async fn register(
        users: &dyn UserRepository,
        passwords: PasswordService,
        req: &RegisterRequest,
    ) -> Result<RegisterResponse, ApiError> {
        let hidden_email = mask_email(&req.email);

        validate_registration(req)?;
        if !req.email.as_str().validate_email() {
            return Err(
                ValidationError::new("email", codes::INVALID_EMAIL, "Invalid email format").into(),
            );
        }

        if users.email_exists(&req.email).await? {
            debug!(email = %hidden_email, "Registration for existing email");
            metrics::record_registration("duplicate");
            return Err(RepositoryError::DuplicateEmail.into());
        }

        let password_hash = passwords.hash_async(req.password.clone()).await?;

        let user = users
            .create(NewUser {
                email: req.email.clone(),
                first_name: req.first_name.trim().to_string(),
                last_name: req.last_name.trim().to_string(),
                password_hash,
            })
            .await
            .map_err(|e| {
                warn!(email = %hidden_email, error = %e, "User was not created");
                e
            })?;

        info!(user_id = %user.id, email = %hidden_email, "User registered");
        metrics::record_registration("created");

        Ok(RegisterResponse {
            user_id: user.id,
            email: user.email,
            message: "Registration successful. Please verify your email.".to_string(),
        })
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password produce the same error. The stored
    /// digest is upgraded when it was made at a different cost.
    pub async fn login(
        users: &dyn UserRepository,
        passwords: PasswordService,
        tokens: &TokenAuthority,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, ApiError> {
        let hidden_email = mask_email(email);

        let Some(user) = users.find_by_email(email).await? else {
            debug!(email = %hidden_email, "Login for unknown user");
            metrics::record_login("invalid_credentials");
            return Err(ApiError::InvalidCredentials);
        };

        let valid = passwords
            .verify_async(password.to_string(), user.password_hash.clone())
            .await?;
        if !valid {
            debug!(user_id = %user.id, email = %hidden_email, "Invalid password");
            metrics::record_login("invalid_credentials");
            return Err(ApiError::InvalidCredentials);
        }

        ensure_active(&user)?;
        Self::upgrade_digest(users, passwords, &user, password).await;

        let pair = tokens.issue_token_pair(&user.id.to_string(), Some(&user.email))?;

        info!(user_id = %user.id, email = %hidden_email, "User logged in");
        metrics::record_login("success");

        Ok(AuthTokens {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: BEARER.to_string(),
            expires_in: pair.expires_in,
            user_id: user.id,
        })
    }

    /// Re-hash at the configured cost; failures are logged and ignored
    async fn upgrade_digest(
        users: &dyn UserRepository,
        passwords: PasswordService,
        user: &UserRecord,
        password: &str,
    ) {
        if !matches!(passwords.needs_rehash(&user.password_hash), Ok(true)) {
            return;
        }

        let result = match passwords.hash_async(password.to_string()).await {
            Ok(digest) => users
                .update_password_hash(user.id, &digest)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => info!(user_id = %user.id, cost = passwords.cost(), "Password digest upgraded"),
            Err(e) => warn!(user_id = %user.id, error = %e, "Password digest upgrade failed"),
        }
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The user must still exist and be active. The presented refresh token
    /// is handed back unchanged rather than rotated.
    pub async fn refresh_token(
        users: &dyn UserRepository,
        tokens: &TokenAuthority,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = tokens.validate_refresh_token(refresh_token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        let user = users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;
        ensure_active(&user)?;

        let access_token = tokens.issue_access_token(&claims.sub, Some(&user.email))?;

        Ok(AuthTokens {
            access_token,
            refresh_token: refresh_token.to_string(),
            token_type: BEARER.to_string(),
            expires_in: tokens.access_token_expiry_secs(),
            user_id,
        })
    }

    /// Report whether an access token is currently valid
    pub fn validate_token(tokens: &TokenAuthority, token: &str) -> TokenValidationResponse {
        match tokens.validate_access_token(token) {
            Ok(claims) => TokenValidationResponse {
                is_valid: true,
                expires_at: claims.expires_at(),
                user_id: Some(claims.sub),
                email: claims.email,
            },
            Err(e) => {
                metrics::record_token_rejection(&e);
                TokenValidationResponse::invalid()
            }
        }
    }

    /// Get user profile
    pub async fn get_profile(
        users: &dyn UserRepository,
        user_id: Uuid,
    ) -> Result<UserProfile, ApiError> {
        let user = users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(profile_of(user))
    }

    /// Replace the user's names and email
    ///
    /// Tokens issued before the change keep the old email claim until
    /// they expire.
    pub async fn update_profile(
        users: &dyn UserRepository,
        user_id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        validate_profile_update(req)?;
        if !req.email.as_str().validate_email() {
            return Err(
                ValidationError::new("email", codes::INVALID_EMAIL, "Invalid email format").into(),
            );
        }

        let hidden_email = mask_email(&req.email);
        let user = users
            .update_profile(
                user_id,
                ProfileUpdate {
                    first_name: req.first_name.trim().to_string(),
                    last_name: req.last_name.trim().to_string(),
                    email: req.email.clone(),
                },
            )
            .await
            .map_err(|e| {
                debug!(user_id = %user_id, email = %hidden_email, error = %e, "Profile not updated");
                e
            })?;

        info!(user_id = %user.id, email = %hidden_email, "Profile updated");
        Ok(profile_of(user))
    }

    /// Create the configured bootstrap account unless it already exists
    pub async fn ensure_bootstrap_user(
        users: &dyn UserRepository,
        passwords: PasswordService,
        bootstrap: &BootstrapUserConfig,
    ) -> Result<(), ApiError> {
        let hidden_email = mask_email(&bootstrap.email);

        if users.email_exists(&bootstrap.email).await? {
            info!(email = %hidden_email, "Bootstrap user already exists");
            return Ok(());
        }

        let password_hash = passwords.hash_async(bootstrap.password.clone()).await?;
        let user = users
            .create(NewUser {
                email: bootstrap.email.clone(),
                first_name: bootstrap.first_name.clone(),
                last_name: bootstrap.last_name.clone(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, email = %hidden_email, "Bootstrap user created");
        Ok(())
    }
}

fn profile_of(user: UserRecord) -> UserProfile {
    UserProfile {
        id: user.id.to_string(),
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        status: user.status,
        is_email_verified: user.is_email_verified,
        created_at: user.created_at,
    }
}

fn ensure_active(user: &UserRecord) -> Result<(), ApiError> {
    if user.status != UserStatus::Active {
        return Err(ApiError::Forbidden(format!(
            "User not allowed due status {}",
            user.status
        )));
    }
    Ok(())
}
