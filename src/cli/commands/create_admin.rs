use anyhow::{Context, Result};
use sea_orm::Database;
use service::{AccountService, Registration};
use tracing::{error, info};

/// Bootstrap an administrator, the only way to obtain the admin role.
pub async fn create_admin(database_url: &str, name: &str, email: &str, password: &str) -> Result<()> {
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let accounts = AccountService::new(db);
    match accounts
        .create_admin(Registration::new(name, email, password))
        .await
    {
        Ok(admin) => {
            info!("Administrator {} created with ID {}", admin.email, admin.id);
            Ok(())
        }
        Err(e) => {
            error!("Failed to create administrator {}: {}", email, e);
            Err(e.into())
        }
    }
}
