use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::path::Path;
use tracing::{debug, error, info, trace};

/// File path behind a `sqlite://` URL, if it names a file on disk.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}

/// Connect and apply every pending migration.
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection> {
    trace!("Attempting to connect to database");
    let db: DatabaseConnection = match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            connection
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    info!("Running database migrations");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }
    debug!("All pending migrations have been applied");

    Ok(db)
}

pub async fn init_database(database_url: &str) -> Result<()> {
    info!("Initializing database");
    debug!("Database URL: {}", database_url);

    if let Some(parent) = sqlite_file_path(database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    connect_and_migrate(database_url).await?;

    info!("Database initialization completed successfully!");
    Ok(())
}
