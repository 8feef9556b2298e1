//! Provisioning of the single account that may sign in.

use thiserror::Error;

use crate::db::{StoreError, UserStore};
use crate::utils::password::hash_password;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("Hashing error: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Creates `username` unless it already exists. Running it twice is a no-op.
pub async fn ensure_user(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<SeedOutcome, SeedError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(SeedError::Empty("username"));
    }
    if password.is_empty() {
        return Err(SeedError::Empty("password"));
    }

    if users.find_user(username).await?.is_some() {
        log::info!("User '{username}' already exists");
        return Ok(SeedOutcome::AlreadyExists);
    }

    let password_hash = hash_password(password).map_err(|err| SeedError::Hash(err.to_string()))?;
    match users.insert_user(username, &password_hash).await {
        Ok(_) => {
            log::info!("User '{username}' created successfully");
            Ok(SeedOutcome::Created)
        }
        // Lost a race with another seeding run.
        Err(StoreError::DuplicateUsername(_)) => Ok(SeedOutcome::AlreadyExists),
        Err(err) => Err(err.into()),
    }
}
