//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys are derived once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::auth::{PasswordService, TokenAuthority};
use crate::config::AppConfig;
use crate::repositories::{InMemoryUserRepository, UserRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token authority with cached keys
    pub tokens: TokenAuthority,
    /// Password hasher at the configured cost
    pub passwords: PasswordService,
    /// User storage
    pub users: Arc<dyn UserRepository>,
    /// Prometheus render handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state backed by a fresh in-memory user store
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        Self::with_repository(config, Arc::new(InMemoryUserRepository::new()))
    }

    pub fn with_repository(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
    ) -> anyhow::Result<Self> {
        let tokens = TokenAuthority::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        )?;
        Self::from_parts(config, tokens, users)
    }

    /// Assemble state around an already built token authority
    ///
    /// Lets tests drive expiry with a manual clock.
    pub fn from_parts(
        config: AppConfig,
        tokens: TokenAuthority,
        users: Arc<dyn UserRepository>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let passwords = PasswordService::new(config.security.bcrypt_cost)?;

        Ok(Self {
            config: Arc::new(config),
            tokens,
            passwords,
            users,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the token authority
    #[inline]
    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }

    #[inline]
    pub fn passwords(&self) -> PasswordService {
        self.passwords
    }

    #[inline]
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_clone_is_cheap() {
        let state = AppState::new(AppConfig::default()).unwrap();
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
    }

    #[test]
    fn test_token_authority_is_precomputed() {
        let state = AppState::new(AppConfig::default()).unwrap();

        let token = state.tokens().issue_access_token("user-42", None).unwrap();
        assert!(state.tokens().validate_access_token(&token).is_ok());
        assert_eq!(state.tokens().access_token_expiry_secs(), 86400);
    }

    #[test]
    fn test_oversized_ttl_fails_state_creation() {
        let mut config = AppConfig::default();
        config.jwt.access_token_expiry_secs = 10_000_000_000_000;
        assert!(AppState::new(config).is_err());
    }

    #[test]
    fn test_invalid_cost_fails_state_creation() {
        let mut config = AppConfig::default();
        config.security.bcrypt_cost = 2;
        assert!(AppState::new(config).is_err());
    }
}
