use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
use std::time::Duration;

use crate::auth::jwt_secret;
use crate::schemas::AppState;

/// Initialize application state against an explicit database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    // Connect to database. The acquire timeout bounds how long a request
    // waits for a connection slot before its transaction is abandoned.
    tracing::info!("Connecting to database: {}", database_url);
    let mut options = ConnectOptions::new(database_url.to_string());
    options
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let db = Database::connect(options).await?;

    Ok(AppState {
        db,
        jwt_secret: jwt_secret(),
    })
}
