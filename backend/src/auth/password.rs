//! Password hashing using bcrypt
//!
//! Digests are standard modular-crypt strings (`$2b$<cost>$<salt><hash>`),
//! so the salt and cost travel with the digest and old digests keep
//! verifying after the configured cost is raised.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. In async contexts use
//! `hash_async` / `verify_async`, which run on the blocking thread pool.

use auth_service_shared::validation::MAX_PASSWORD_BYTES;
use auth_service_shared::CredentialError;
use tracing::error;

/// Lowest cost bcrypt accepts
pub const MIN_COST: u32 = 4;
/// Highest cost bcrypt accepts
pub const MAX_COST: u32 = 31;
/// Default work factor
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Password hashing service
///
/// Holds only the work factor, so it is `Copy` and can be moved into
/// blocking tasks freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    /// Create a hasher with the given bcrypt cost
    pub fn new(cost: u32) -> Result<Self, CredentialError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(CredentialError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    #[inline]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt (blocking operation)
    ///
    /// Empty input and input longer than bcrypt's 72-byte window are
    /// rejected before any hashing work.
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        if password.is_empty() {
            return Err(CredentialError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(CredentialError::InvalidInput(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        bcrypt::hash(password, self.cost).map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(&self, password: String) -> Result<String, CredentialError> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| CredentialError::Hashing(format!("task join error: {}", e)))?
    }

    /// Verify a password against a digest (blocking operation)
    ///
    /// A wrong password is `Ok(false)`. Only a digest that is not a bcrypt
    /// string at all produces `MalformedDigest`.
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, CredentialError> {
        embedded_cost(digest)?;

        // Nothing this long can have been hashed by `hash`, and bcrypt would
        // silently compare only the first 72 bytes.
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        bcrypt::verify(password, digest).map_err(|e| {
            error!(error = %e, "Stored password digest failed to parse");
            CredentialError::MalformedDigest(e.to_string())
        })
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(
        &self,
        password: String,
        digest: String,
    ) -> Result<bool, CredentialError> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.verify(&password, &digest))
            .await
            .map_err(|e| CredentialError::Hashing(format!("task join error: {}", e)))?
    }

    /// True when the digest was produced with a different cost than ours
    pub fn needs_rehash(&self, digest: &str) -> Result<bool, CredentialError> {
        Ok(embedded_cost(digest)? != self.cost)
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

/// Read the cost out of `$2?$NN$<53 chars>`
fn embedded_cost(digest: &str) -> Result<u32, CredentialError> {
    let malformed = |reason: &str| {
        error!(reason, "Stored password digest is malformed");
        CredentialError::MalformedDigest(reason.to_string())
    };

    let mut parts = digest.split('$');
    if parts.next() != Some("") {
        return Err(malformed("missing leading '$'"));
    }
    match parts.next() {
        Some("2a" | "2b" | "2x" | "2y") => {}
        _ => return Err(malformed("unknown bcrypt version")),
    }
    let cost = parts
        .next()
        .filter(|c| c.len() == 2)
        .and_then(|c| c.parse::<u32>().ok())
        .ok_or_else(|| malformed("unreadable cost"))?;
    match parts.next() {
        Some(rest) if rest.len() == 53 && parts.next().is_none() => Ok(cost),
        _ => Err(malformed("wrong salt/hash length")),
    }
}
