use std::path::PathBuf;

use thiserror::Error;
use url::Url;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366 * 10;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Server settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl: time::Duration,
    pub max_image_bytes: usize,
    pub upload_dir: PathBuf,
    pub public_base_url: Url,
    pub s3_bucket: Option<String>,
    pub aws_region: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::Missing(name))?;
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
            Ok(value)
        };
        let optional = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());

        let token_ttl_hours = parse_number(
            optional("TOKEN_TTL_HOURS"),
            "TOKEN_TTL_HOURS",
            DEFAULT_TOKEN_TTL_HOURS,
        )?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_HOURS}"),
            });
        }

        let public_base_url = optional("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{DEFAULT_BIND_ADDRESS}"));
        let public_base_url = parse_base_url(&public_base_url)?;

        Ok(Self {
            bind_address: optional("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            token_ttl: time::Duration::hours(token_ttl_hours),
            max_image_bytes: parse_number(
                optional("MAX_IMAGE_BYTES"),
                "MAX_IMAGE_BYTES",
                DEFAULT_MAX_IMAGE_BYTES,
            )?,
            upload_dir: optional("UPLOAD_DIR")
                .map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
            public_base_url,
            s3_bucket: optional("AWS_S3_BUCKET"),
            aws_region: optional("AWS_REGION"),
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |v| {
        v.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
        })
    })
}

/// Parses the public base URL, forcing a trailing slash so `join` appends.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let with_slash = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    Url::parse(&with_slash).map_err(|err| ConfigError::Invalid {
        name: "PUBLIC_BASE_URL",
        reason: err.to_string(),
    })
}
