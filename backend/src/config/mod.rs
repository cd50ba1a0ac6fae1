//! Configuration management for the auth service
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: AUTH__)
//!
//! The loaded value is immutable for the life of the process. Changing the
//! signing secret or hash cost means a restart.

use crate::auth::{DEFAULT_COST, MAX_COST, MAX_TTL_SECS, MIN_COST};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Lowest bcrypt cost accepted in production
pub const MIN_PRODUCTION_COST: u32 = 10;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    #[serde(default)]
    pub service: ServiceInfo,
    #[serde(default)]
    pub bootstrap: Option<BootstrapUserConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma separated list, or "*" for any origin
    pub allowed_origins: String,
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

// Keeps the secret out of startup logs
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.refresh_token_expiry_secs)
            .finish()
    }
}

/// Password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
}

/// Service identity reported by the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: "auth-service".to_string(),
        }
    }
}

/// Account created at startup if missing
#[derive(Clone, Serialize, Deserialize)]
pub struct BootstrapUserConfig {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl std::fmt::Debug for BootstrapUserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapUserConfig")
            .field("email", &auth_service_shared::mask_email(&self.email))
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                allowed_origins: "http://localhost:3000,http://localhost:8000".to_string(),
            },
            jwt: JwtConfig {
                secret: "development-secret-change-in-production".to_string(),
                access_token_expiry_secs: 86400,     // 24 hours
                refresh_token_expiry_secs: 604800,   // 7 days
            },
            security: SecurityConfig {
                bcrypt_cost: DEFAULT_COST,
            },
            service: ServiceInfo::default(),
            bootstrap: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with AUTH__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., AUTH__JWT__SECRET=... sets jwt.secret
            .add_source(config::Environment::with_prefix("AUTH").separator("__"))
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that hold in every environment
    pub fn validate(&self) -> Result<()> {
        if self.jwt.secret.is_empty() {
            anyhow::bail!("jwt.secret must not be empty");
        }
        if !(MIN_COST..=MAX_COST).contains(&self.security.bcrypt_cost) {
            anyhow::bail!(
                "security.bcrypt_cost must be between {} and {}",
                MIN_COST,
                MAX_COST
            );
        }
        for (name, secs) in [
            ("jwt.access_token_expiry_secs", self.jwt.access_token_expiry_secs),
            ("jwt.refresh_token_expiry_secs", self.jwt.refresh_token_expiry_secs),
        ] {
            if !(-MAX_TTL_SECS..=MAX_TTL_SECS).contains(&secs) {
                anyhow::bail!("{} must be within ±{} seconds", name, MAX_TTL_SECS);
            }
        }
        Ok(())
    }

    /// Stricter checks for production deployment
    pub fn validate_production(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.jwt.secret.contains("development") || self.jwt.secret.len() < 32 {
            errors.push("JWT secret must be at least 32 characters and not contain 'development'");
        }
        if self.security.bcrypt_cost < MIN_PRODUCTION_COST {
            errors.push("bcrypt cost must be at least 10 in production");
        }

        if !errors.is_empty() {
            anyhow::bail!("Invalid production configuration: {}", errors.join("; "));
        }
        Ok(())
    }

    /// Parsed CORS origins; `None` means any origin
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let raw = self.server.allowed_origins.trim();
        if raw == "*" {
            return None;
        }
        Some(
            raw.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
