use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use employee_manager::config::AppConfig;
use employee_manager::db::{create_pool, PgStore};
use employee_manager::utils::jwt::TokenIssuer;
use employee_manager::utils::s3::{create_s3_client, S3ImageStore};
use employee_manager::utils::storage::{ImageStore, LocalImageStore};
use employee_manager::{configure, AppState};
use log::info;

fn to_io_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(to_io_error)?;

    let pool = create_pool(&config.database_url).await.map_err(to_io_error)?;
    let store = Arc::new(PgStore::new(pool));

    let images: Arc<dyn ImageStore> = match &config.s3_bucket {
        Some(bucket) => {
            info!("Storing images in S3 bucket {bucket}");
            let client = create_s3_client(config.aws_region.clone()).await;
            Arc::new(S3ImageStore::new(client, bucket.clone()))
        }
        None => {
            info!("Storing images in {}", config.upload_dir.display());
            Arc::new(
                LocalImageStore::new(config.upload_dir.clone(), config.public_base_url.clone())
                    .await
                    .map_err(to_io_error)?,
            )
        }
    };

    let state = AppState {
        employees: store.clone(),
        users: store,
        images,
        tokens: TokenIssuer::new(&config.jwt_secret, config.token_ttl),
        max_image_bytes: config.max_image_bytes,
    };

    info!("Starting server at {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
