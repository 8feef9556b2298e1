use std::env;
use std::process::ExitCode;

use dotenv::dotenv;
use employee_manager::db::{create_pool, PgStore};
use employee_manager::seed::{ensure_user, SeedOutcome};
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (Ok(database_url), Ok(username), Ok(password)) = (
        env::var("DATABASE_URL"),
        env::var("ADMIN_USERNAME"),
        env::var("ADMIN_PASSWORD"),
    ) else {
        error!("DATABASE_URL, ADMIN_USERNAME and ADMIN_PASSWORD must be set");
        return ExitCode::FAILURE;
    };

    let pool = match create_pool(&database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Database connection error: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!("Database connected");

    let store = PgStore::new(pool.clone());
    let result = ensure_user(&store, &username, &password).await;
    pool.close().await;

    match result {
        Ok(SeedOutcome::Created | SeedOutcome::AlreadyExists) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Failed to create user: {err}");
            ExitCode::FAILURE
        }
    }
}
