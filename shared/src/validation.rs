//! Input validation functions
//!
//! Registration input rules. Every check returns a [`ValidationError`]
//! naming the offending field so the API layer can report it.

use crate::types::{RegisterRequest, UpdateProfileRequest};
use regex_lite::Regex;
use std::sync::OnceLock;

/// Minimum password length in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// bcrypt only reads the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Characters accepted as the "special" class of a strong password
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

/// Error codes carried by [`ValidationError`]
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
    pub const WEAK_PASSWORD: &str = "WEAK_PASSWORD";
    pub const PASSWORD_MISMATCH: &str = "PASSWORD_MISMATCH";
    pub const MAX_ALLOWED_WORDS: &str = "MAX_ALLOWED_WORDS";
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
}

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub code: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            code,
            message: message.into(),
        }
    }
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = |message: &str| ValidationError::new("email", codes::INVALID_EMAIL, message);

    if email.is_empty() {
        return Err(invalid("Email cannot be empty"));
    }
    if email.len() > 255 {
        return Err(invalid("Email too long"));
    }
    if !email_regex().is_match(email) {
        return Err(invalid("Invalid email format"));
    }
    Ok(())
}

/// Validate password strength
///
/// At least 8 characters, at most 72 bytes, with one uppercase letter,
/// one lowercase letter, one digit and one special character.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let weak = |message: &str| ValidationError::new("password", codes::WEAK_PASSWORD, message);

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(weak("Password must be at least 8 characters long"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(weak("Password must be at most 72 bytes long"));
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if !(has_upper && has_lower && has_digit && has_special) {
        return Err(weak(
            "Password must contain at least one uppercase letter, one lowercase letter, \
             one number, and one special character",
        ));
    }
    Ok(())
}

/// Validate a first or last name: non-empty once trimmed, a single word
pub fn validate_name(field: &str, name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            field,
            codes::VALIDATION_ERROR,
            "Name cannot be empty",
        ));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(
            field,
            codes::MAX_ALLOWED_WORDS,
            "Name fields must be a single word without spaces",
        ));
    }
    if trimmed.len() > 100 {
        return Err(ValidationError::new(field, codes::VALIDATION_ERROR, "Name too long"));
    }
    Ok(())
}

/// Validate a full registration request, reporting the first failing field
pub fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationError> {
    validate_name("first_name", &req.first_name)?;
    validate_name("last_name", &req.last_name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    if req.password != req.password_confirmation {
        return Err(ValidationError::new(
            "password_confirmation",
            codes::PASSWORD_MISMATCH,
            "Password confirmation does not match",
        ));
    }
    Ok(())
}

/// Validate a profile update: the same name and email rules as registration
pub fn validate_profile_update(req: &UpdateProfileRequest) -> Result<(), ValidationError> {
    validate_name("first_name", &req.first_name)?;
    validate_name("last_name", &req.last_name)?;
    validate_email(&req.email)
}
