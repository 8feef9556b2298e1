pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod seed;
pub mod utils;

use std::sync::Arc;

use actix_web::web;

use crate::db::{EmployeeStore, UserStore};
use crate::errors::AppError;
use crate::utils::jwt::TokenIssuer;
use crate::utils::storage::ImageStore;

/// Shared services handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<dyn EmployeeStore>,
    pub users: Arc<dyn UserStore>,
    pub images: Arc<dyn ImageStore>,
    pub tokens: TokenIssuer,
    pub max_image_bytes: usize,
}

/// Registers every route. Shared by the server binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(err.to_string()).into()
    }))
    .service(web::resource("/login").route(web::post().to(handlers::auth::login)))
    .service(web::resource("/auth/verify").route(web::get().to(handlers::auth::verify)))
    .service(
        web::resource("/employees")
            .route(web::post().to(handlers::employee::create_employee))
            .route(web::get().to(handlers::employee::get_employees)),
    )
    .service(
        web::resource("/employees/{id}")
            .route(web::get().to(handlers::employee::get_employee))
            .route(web::patch().to(handlers::employee::update_employee))
            .route(web::delete().to(handlers::employee::delete_employee)),
    )
    .service(web::resource("/uploads/{key}").route(web::get().to(handlers::file::get_image)));
}
