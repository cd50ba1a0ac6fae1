//! JWT token generation and validation
//!
//! Provides access and refresh token management with pre-computed keys.
//! Tokens are HS256 compact JWS strings signed with a single shared secret;
//! nothing about them is stored server-side.

use auth_service_shared::{TokenError, TokenKind};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::clock::{Clock, SystemClock};

/// Signing algorithm for every token this service issues
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Largest TTL magnitude accepted, in seconds (ten years)
pub const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 3600;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Token type: "access" or "refresh"
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Display email, access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Per-token identifier, reserved for revocation tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token lifetimes
#[derive(Debug, Clone, Copy)]
pub struct TokenTtl {
    pub access: Duration,
    pub refresh: Duration,
}

impl TokenTtl {
    /// Build lifetimes from signed second counts within `±MAX_TTL_SECS`
    pub fn from_secs(access_secs: i64, refresh_secs: i64) -> Result<Self, TokenError> {
        Ok(Self {
            access: ttl_from_secs(access_secs)?,
            refresh: ttl_from_secs(refresh_secs)?,
        })
    }
}

fn ttl_from_secs(secs: i64) -> Result<Duration, TokenError> {
    if !(-MAX_TTL_SECS..=MAX_TTL_SECS).contains(&secs) {
        return Err(TokenError::Lifetime(format!(
            "{}s exceeds the {}s limit",
            secs, MAX_TTL_SECS
        )));
    }
    Duration::try_seconds(secs).ok_or_else(|| TokenError::Lifetime(format!("{}s", secs)))
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            access: Duration::hours(24),
            refresh: Duration::days(7),
        }
    }
}

/// Access and refresh token issued together at login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Issues and validates signed tokens
///
/// Cloning is cheap: keys are behind `Arc` and the clock is shared.
/// Expiry is judged solely by the injected clock, with no leeway.
#[derive(Clone)]
pub struct TokenAuthority {
    keys: JwtKeys,
    ttl: TokenTtl,
    validation: Arc<Validation>,
    clock: Arc<dyn Clock>,
}

impl TokenAuthority {
    /// Create a token authority on the system clock
    ///
    /// Call this once at application startup and store in AppState.
    pub fn new(
        secret: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
    ) -> Result<Self, TokenError> {
        Ok(Self::with_clock(
            JwtKeys::new(secret),
            TokenTtl::from_secs(access_token_expiry_secs, refresh_token_expiry_secs)?,
            Arc::new(SystemClock),
        ))
    }

    pub fn with_clock(keys: JwtKeys, ttl: TokenTtl, clock: Arc<dyn Clock>) -> Self {
        // Expiry is checked against our own clock in `decode`, so the
        // library's wall-clock checks are switched off.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys,
            ttl,
            validation: Arc::new(validation),
            clock,
        }
    }

    /// Issue an access token carrying the subject and an optional display email
    pub fn issue_access_token(&self, subject: &str, email: Option<&str>) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Access, self.ttl.access, email)
    }

    /// Issue a refresh token carrying only the subject
    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Refresh, self.ttl.refresh, None)
    }

    pub fn issue_token_pair(&self, subject: &str, email: Option<&str>) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(subject, email)?,
            refresh_token: self.issue_refresh_token(subject)?,
            expires_in: self.access_token_expiry_secs(),
        })
    }

    fn issue(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
        email: Option<&str>,
    ) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let now = self.clock.now();
        let expires = now.checked_add_signed(ttl).ok_or_else(|| {
            TokenError::Lifetime(format!("{} plus {}s is out of range", now, ttl.num_seconds()))
        })?;
        let claims = Claims {
            sub: subject.to_string(),
            kind,
            iat: now.timestamp(),
            exp: expires.timestamp(),
            email: email.map(str::to_string),
            jti: Some(Uuid::new_v4().to_string()),
        };

        encode(&Header::new(ALGORITHM), &claims, self.keys.encoding())
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validate a token and return its claims
    ///
    /// Checks, in order: structure, signature, claim shape, expiry
    /// (`now >= exp` is expired) and finally that the kind matches.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map_err(map_decode_error)?
            .claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                found: claims.kind,
            });
        }

        Ok(claims)
    }

    /// Validate an access token specifically
    #[inline]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode(token, TokenKind::Access)
    }

    /// Validate a refresh token specifically
    #[inline]
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode(token, TokenKind::Refresh)
    }

    /// Exchange a refresh token for a new access token for the same subject
    ///
    /// The refresh token itself is not re-issued; it stays usable until its
    /// own expiry. The new access token carries no email since refresh
    /// tokens do not hold one.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let claims = self.validate_refresh_token(refresh_token)?;
        self.issue_access_token(&claims.sub, None)
    }

    /// Get access token expiry in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.ttl.access.num_seconds()
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::Signature,
        _ => TokenError::Malformed(err.to_string()),
    }
}
