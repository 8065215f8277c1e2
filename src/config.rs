use crate::schemas::AppState;
use crate::storage::{LocalMediaStore, MediaStore};
use anyhow::Result;
use moka::future::Cache;
use sea_orm::Database;
use std::sync::Arc;
use std::time::Duration;

/// Initialize application configuration and state from the environment.
pub async fn initialize_app_state() -> Result<AppState> {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://ulinzi.db".to_string());
    let media_root = get_media_root();

    initialize_app_state_with_url(&database_url, &media_root).await
}

/// Initialize application state against an explicit database URL and media
/// root (used by the CLI, which parses its own arguments).
pub async fn initialize_app_state_with_url(database_url: &str, media_root: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let cache = Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes
        .build();

    let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(media_root));

    Ok(AppState { db, cache, media })
}

/// Get bind address from environment or use default
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

/// Get the media storage root from environment or use default
pub fn get_media_root() -> String {
    std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string())
}
