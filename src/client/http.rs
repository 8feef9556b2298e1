use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::{ClientError, CreateEmployeeRequest, EmployeeApi, Session};
use crate::errors::ErrorResponse;
use crate::handlers::auth::{LoginRequest, LoginResponse, VerifyResponse};
use crate::models::employee::{Employee, EmployeeEnvelope};

/// [`EmployeeApi`] over HTTP.
#[derive(Clone)]
pub struct HttpEmployeeApi {
    base: Url,
    http: reqwest::Client,
}

impl HttpEmployeeApi {
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let base = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        Ok(Self {
            base,
            http: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn authorized(
        session: &Session,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, ClientError> {
        let token = session.token().ok_or(ClientError::NotLoggedIn)?;
        Ok(request.bearer_auth(token))
    }
}

/// Decodes a success body, or turns an error body into [`ClientError::Api`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .map(|body| body.error.message);
    log::debug!("Request failed with status {status}: {message:?}");

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

impl CreateEmployeeRequest {
    /// Multipart body with `course` repeated once per selected course.
    pub fn to_form(&self) -> Result<Form, ClientError> {
        let mut form = Form::new()
            .text("name", self.name.clone())
            .text("email", self.email.clone())
            .text("mobile", self.mobile.clone())
            .text("designation", self.designation.as_str())
            .text("gender", self.gender.as_str());
        for course in &self.course {
            form = form.text("course", course.as_str());
        }

        if let Some(image) = &self.image {
            let mut part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
            if let Some(content_type) = &image.content_type {
                part = part.mime_str(content_type)?;
            }
            form = form.part("image", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl EmployeeApi for HttpEmployeeApi {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.url("login")?)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn verify(&self, session: &Session) -> Result<VerifyResponse, ClientError> {
        let request = Self::authorized(session, self.http.get(self.url("auth/verify")?))?;
        decode(request.send().await?).await
    }

    async fn create_employee(
        &self,
        session: &Session,
        request: &CreateEmployeeRequest,
    ) -> Result<Employee, ClientError> {
        let builder = Self::authorized(session, self.http.post(self.url("employees")?))?
            .multipart(request.to_form()?);
        let envelope: EmployeeEnvelope = decode(builder.send().await?).await?;
        Ok(envelope.employee)
    }

    async fn list_employees(&self, session: &Session) -> Result<Vec<Employee>, ClientError> {
        let request = Self::authorized(session, self.http.get(self.url("employees")?))?;
        decode(request.send().await?).await
    }
}
