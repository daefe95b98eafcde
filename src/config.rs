use anyhow::Result;
use sea_orm::Database;
use service::UploadStore;
use std::path::Path;
use std::time::Duration;

use crate::schemas::AppState;
use crate::session::SessionStore;

/// Initialize application state against the given database
pub async fn initialize_app_state_with_url(
    database_url: &str,
    upload_dir: &Path,
    session_ttl: Duration,
) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    tracing::info!("Uploads are stored in {}", upload_dir.display());
    let sessions = SessionStore::new(session_ttl);
    let uploads = UploadStore::new(upload_dir);

    Ok(AppState::new(db, sessions, uploads))
}
