//! Auth Service Backend Library
//!
//! Credential hashing, token issuance and the HTTP surface around them.
//! Exposed as a library for the integration tests.

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
