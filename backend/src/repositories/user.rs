//! User repository
//!
//! Persistence sits outside the credential layer; handlers talk to it only
//! through [`UserRepository`]. [`InMemoryUserRepository`] backs the binary
//! and the test suites.

use async_trait::async_trait;
use auth_service_shared::UserStatus;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Stored user
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub status: UserStatus,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Replacement values for a user's editable profile fields
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// User persistence operations used by the auth workflows
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; fails with `DuplicateEmail` if the email is taken
    async fn create(&self, user: NewUser) -> RepositoryResult<UserRecord>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<UserRecord>>;

    async fn email_exists(&self, email: &str) -> RepositoryResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> RepositoryResult<()>;

    async fn update_status(&self, id: Uuid, status: UserStatus) -> RepositoryResult<()>;

    /// Replace names and email; `DuplicateEmail` if another user holds the email
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate)
        -> RepositoryResult<UserRecord>;
}

/// Process-local user store
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> RepositoryResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::DuplicateEmail);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            status: UserStatus::Active,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> RepositoryResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: UserStatus) -> RepositoryResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.status = status;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> RepositoryResult<UserRecord> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id != id && u.email == update.email)
        {
            return Err(RepositoryError::DuplicateEmail);
        }

        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.first_name = update.first_name;
        user.last_name = update.last_name;
        user.email = update.email;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}
