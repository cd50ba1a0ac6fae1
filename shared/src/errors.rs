//! Error types for the credential and token layer

use crate::types::TokenKind;
use thiserror::Error;

/// Password hashing and verification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Plaintext rejected before any hashing work
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored digest does not have the expected encoding
    #[error("Malformed digest: {0}")]
    MalformedDigest(String),

    #[error("Invalid cost factor {0}: must be between 4 and 31")]
    InvalidCost(u32),

    #[error("Hashing failed: {0}")]
    Hashing(String),
}

impl CredentialError {
    pub fn code(&self) -> &'static str {
        match self {
            CredentialError::InvalidInput(_) => "INVALID_INPUT",
            CredentialError::MalformedDigest(_) => "MALFORMED_DIGEST",
            CredentialError::InvalidCost(_) => "INVALID_COST",
            CredentialError::Hashing(_) => "HASHING_FAILED",
        }
    }
}

/// Token issuance and decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature does not verify under the current secret
    #[error("Invalid token signature")]
    Signature,

    /// Token cannot be split or its claims cannot be parsed
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signature valid but the token is past its expiry
    #[error("Token has expired")]
    Expired,

    #[error("Token type mismatch: expected {expected}, found {found}")]
    WrongKind { expected: TokenKind, found: TokenKind },

    #[error("Token subject must not be empty")]
    EmptySubject,

    #[error("Failed to encode token: {0}")]
    Encoding(String),

    /// TTL cannot be represented, or issue time plus TTL leaves the calendar
    #[error("Token lifetime out of range: {0}")]
    Lifetime(String),
}

impl TokenError {
    /// Stable identifier used in logs and metric labels
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Signature => "invalid_signature",
            TokenError::Malformed(_) => "malformed",
            TokenError::Expired => "expired",
            TokenError::WrongKind { .. } => "wrong_kind",
            TokenError::EmptySubject => "empty_subject",
            TokenError::Encoding(_) => "encoding",
            TokenError::Lifetime(_) => "lifetime",
        }
    }

    /// True for failures of a presented token, as opposed to issuance failures
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            TokenError::EmptySubject | TokenError::Encoding(_) | TokenError::Lifetime(_)
        )
    }
}
