//! User storage
//!
//! Provides the data access seam for the auth workflows.

pub mod user;

pub use user::{
    InMemoryUserRepository, NewUser, ProfileUpdate, RepositoryError, RepositoryResult,
    UserRecord, UserRepository,
};
