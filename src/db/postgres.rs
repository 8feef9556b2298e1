use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{EmployeeStore, StoreError, UserStore};
use crate::models::employee::{Course, Employee, EmployeeUpdate, NewEmployee, UnknownVariant};
use crate::models::file::StoredFile;
use crate::models::user::User;

const EMPLOYEE_COLUMNS: &str = "id, name, email, mobile, designation, course, gender, image_key, image_uri, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: Uuid,
    name: String,
    email: String,
    mobile: String,
    designation: String,
    course: Vec<String>,
    gender: String,
    image_key: Option<String>,
    image_uri: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |err: UnknownVariant| StoreError::Corrupt(format!("employee {id}: {err}"));
        Ok(Self {
            id,
            designation: row.designation.parse().map_err(corrupt)?,
            course: row
                .course
                .iter()
                .map(|c| c.parse::<Course>())
                .collect::<Result<BTreeSet<_>, _>>()
                .map_err(corrupt)?,
            gender: row.gender.parse().map_err(corrupt)?,
            name: row.name,
            email: row.email,
            mobile: row.mobile,
            image: row.image_uri,
            image_key: row.image_key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn course_column(course: &BTreeSet<Course>) -> Vec<String> {
    course.iter().map(|c| c.as_str().to_string()).collect()
}

fn map_unique_violation(err: sqlx::Error, email: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some("employees_email_key") {
            return StoreError::DuplicateEmail(email.to_string());
        }
    }
    StoreError::Database(err)
}

/// PostgreSQL-backed store for employees and users.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for PgStore {
    async fn insert_employee(
        &self,
        employee: NewEmployee,
        image: Option<StoredFile>,
    ) -> Result<Employee, StoreError> {
        let now = Utc::now();
        let record = Employee {
            id: Uuid::new_v4(),
            name: employee.name,
            email: employee.email,
            mobile: employee.mobile,
            designation: employee.designation,
            course: employee.course,
            gender: employee.gender,
            image: image.as_ref().map(|file| file.uri.clone()),
            image_key: image.map(|file| file.key),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO employees (id, name, email, mobile, designation, course, gender, image_key, image_uri, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.mobile)
        .bind(record.designation.as_str())
        .bind(course_column(&record.course))
        .bind(record.gender.as_str())
        .bind(&record.image_key)
        .bind(&record.image)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| map_unique_violation(err, &record.email))?;

        Ok(record)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Employee::try_from)
        .transpose()
    }

    async fn update_employee(
        &self,
        id: Uuid,
        update: &EmployeeUpdate,
    ) -> Result<Option<Employee>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let Some(row) = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let mut employee = Employee::try_from(row)?;
        update.apply_to(&mut employee, Utc::now());

        sqlx::query(
            "UPDATE employees SET name = $1, email = $2, mobile = $3, designation = $4, course = $5, gender = $6, updated_at = $7
             WHERE id = $8",
        )
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.mobile)
        .bind(employee.designation.as_str())
        .bind(course_column(&employee.course))
        .bind(employee.gender.as_str())
        .bind(employee.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|err| map_unique_violation(err, &employee.email))?;

        tx.commit().await?;
        Ok(Some(employee))
    }

    async fn delete_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        sqlx::query_as::<_, EmployeeRow>(&format!(
            "DELETE FROM employees WHERE id = $1 RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Employee::try_from)
        .transpose()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, (Uuid, String, String, DateTime<Utc>)>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(|(id, username, password_hash, created_at)| User {
            id,
            username,
            password_hash,
            created_at,
        }))
    }

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                if db_err.is_unique_violation() {
                    return StoreError::DuplicateUsername(username.to_string());
                }
            }
            StoreError::Database(err)
        })?;

        Ok(user)
    }
}
