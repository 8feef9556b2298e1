//! Typed client for the employee service.
//!
//! [`form::EmployeeForm`] and [`dashboard::Dashboard`] model the add-employee
//! form and the dashboard screen; they talk to the service through the
//! [`EmployeeApi`] trait so they can run against [`http::HttpEmployeeApi`] or
//! a stand-in.

pub mod dashboard;
pub mod form;
pub mod http;
pub mod session;

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::handlers::auth::{LoginResponse, VerifyResponse};
use crate::models::employee::{Course, Designation, Employee, Gender};

pub use session::Session;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}", .message.as_deref().unwrap_or("Request failed"))]
    Api { status: u16, message: Option<String> },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("Not logged in")]
    NotLoggedIn,
}

impl ClientError {
    /// The service's own error message, when it sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. } | Self::NotLoggedIn)
    }
}

/// An image file attached to a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Body of `POST /employees`, one field per attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: Designation,
    pub course: BTreeSet<Course>,
    pub gender: Gender,
    pub image: Option<ImageFile>,
}

#[async_trait]
pub trait EmployeeApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError>;

    async fn verify(&self, session: &Session) -> Result<VerifyResponse, ClientError>;

    async fn create_employee(
        &self,
        session: &Session,
        request: &CreateEmployeeRequest,
    ) -> Result<Employee, ClientError>;

    async fn list_employees(&self, session: &Session) -> Result<Vec<Employee>, ClientError>;
}
