#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{web, App};
use employee_manager::db::MemoryStore;
use employee_manager::seed::ensure_user;
use employee_manager::utils::jwt::TokenIssuer;
use employee_manager::utils::storage::MemoryImageStore;
use employee_manager::{configure, AppState};
use url::Url;

pub const USERNAME: &str = "testUser@gmail.com";
pub const PASSWORD: &str = "test@1234";
pub const BOUNDARY: &str = "----employee-form-boundary";
pub const MAX_IMAGE_BYTES: usize = 1024;

pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

pub struct Harness {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub images: Arc<MemoryImageStore>,
}

impl Harness {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let images = Arc::new(MemoryImageStore::new(
            Url::parse("http://localhost:8080/").unwrap(),
        ));
        ensure_user(store.as_ref(), USERNAME, PASSWORD).await.unwrap();

        let state = AppState {
            employees: store.clone(),
            users: store.clone(),
            images: images.clone(),
            tokens: TokenIssuer::new("test-secret", time::Duration::hours(1)),
            max_image_bytes: MAX_IMAGE_BYTES,
        };

        Self {
            state,
            store,
            images,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .configure(configure)
    }

    pub fn token(&self) -> String {
        self.state.tokens.issue(USERNAME).unwrap().token
    }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn employee_parts<'a>(email: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::Text("name", "Jo"),
        Part::Text("email", email),
        Part::Text("mobile", "5551234"),
        Part::Text("designation", "Developer"),
        Part::Text("course", "BCA"),
        Part::Text("gender", "Male"),
    ]
}
