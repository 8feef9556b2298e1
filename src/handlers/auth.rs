use actix_web::dev::Payload;
use actix_web::{http, web, FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{ready, Ready};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::errors::AppError;
use crate::utils::password::verify_password;
use crate::utils::validation::validate_payload;
use crate::AppState;

#[derive(Deserialize, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// The caller behind a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
    pub expires_at: OffsetDateTime,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| auth.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Storage("Application state is not configured".to_string()))?;
    let token =
        bearer_token(req).ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

    let claims = state.tokens.validate(token).map_err(|err| {
        log::warn!("Rejected token on '{}': {err}", req.path());
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;
    let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    Ok(AuthenticatedUser {
        username: claims.sub,
        expires_at,
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&req.0)?;

    let user = state.users.find_user(&req.username).await?;
    let Some(user) = user.filter(|user| verify_password(&req.password, &user.password_hash))
    else {
        log::warn!("Failed login attempt for '{}'", req.username);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let issued = state
        .tokens
        .issue(&user.username)
        .map_err(|err| AppError::Storage(format!("Token generation error: {err}")))?;
    log::info!("User '{}' logged in", user.username);

    Ok(HttpResponse::Ok().json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

pub async fn verify(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(VerifyResponse {
        username: user.username,
        expires_at: user.expires_at,
    })
}
