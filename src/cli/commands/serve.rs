use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use super::initdb::connect_and_migrate;
use crate::config::initialize_app_state_with_url;
use crate::router::create_router;

/// Settings of the `serve` command after CLI and environment resolution.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub database_url: String,
    pub bind_address: String,
    pub upload_dir: PathBuf,
    pub session_ttl: Duration,
    pub migrate: bool,
}

pub async fn serve(options: ServeOptions) -> Result<()> {
    info!("Cafe Finder starting up");
    debug!("Database URL: {}", options.database_url);
    debug!("Bind address: {}", options.bind_address);

    if options.migrate {
        connect_and_migrate(&options.database_url).await?;
    }

    trace!("Initializing application state");
    let state = match initialize_app_state_with_url(
        &options.database_url,
        &options.upload_dir,
        options.session_ttl,
    )
    .await
    {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    let app = create_router(state);

    info!("Starting server on {}", options.bind_address);
    let listener = match TcpListener::bind(&options.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", options.bind_address, e);
            return Err(e.into());
        }
    };

    info!("Cafe Finder running on http://{}", options.bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", options.bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
