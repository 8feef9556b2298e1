pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::models::file::StoredFile;
use crate::models::user::User;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email '{0}' is already in use")]
    DuplicateEmail(String),
    #[error("Username '{0}' is already in use")]
    DuplicateUsername(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Durable home of employee records.
///
/// Email uniqueness (case-insensitive) is the store's job; callers rely on
/// `StoreError::DuplicateEmail` rather than checking first.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn insert_employee(
        &self,
        employee: NewEmployee,
        image: Option<StoredFile>,
    ) -> Result<Employee, StoreError>;

    /// All records in insertion order.
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;

    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError>;

    async fn update_employee(
        &self,
        id: Uuid,
        update: &EmployeeUpdate,
    ) -> Result<Option<Employee>, StoreError>;

    /// Removes and returns the record.
    async fn delete_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;
}

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
