//! Resolution of the request principal to a user record.
//!
//! The web layer builds an [`AuthContext`] once per request and passes it
//! down explicitly; nothing in this crate reads ambient session state.

use model::entities::user;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::Result;

/// Principal name that never counts as a logged-in user.
pub const ANONYMOUS_PRINCIPAL: &str = "anonymous";

/// Why a request could not be tied to a permitted user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable principal on the request
    #[error("User not logged in")]
    NotAuthenticated,

    /// The principal is set but there is no user row for it
    #[error("User not found: {0}")]
    UnknownUser(String),

    /// The user exists but is not an administrator
    #[error("Administrator role required")]
    Forbidden,

    /// The account was banned by an administrator
    #[error("Account is banned: {0}")]
    Banned(String),
}

/// Identity of the caller for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    principal: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    /// Context for a caller identified by email.
    pub fn for_principal(email: impl Into<String>) -> Self {
        Self {
            principal: Some(email.into()),
        }
    }

    /// The principal, or `None` when the caller is not authenticated.
    /// Empty principals and the anonymous sentinel are treated as absent.
    pub fn principal(&self) -> Option<&str> {
        self.principal
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != ANONYMOUS_PRINCIPAL)
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}

/// Looks up the user behind `auth`.
///
/// Fails with [`AuthError::NotAuthenticated`] when there is no principal,
/// with [`AuthError::UnknownUser`] when the principal has no matching row and
/// with [`AuthError::Banned`] for banned accounts.
#[instrument(skip(db))]
pub async fn resolve_user(db: &DatabaseConnection, auth: &AuthContext) -> Result<user::Model> {
    let Some(email) = auth.principal() else {
        debug!("Request has no authenticated principal");
        return Err(AuthError::NotAuthenticated.into());
    };

    match user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
    {
        Some(user) if user.is_banned() => {
            warn!("Banned user {} attempted a request", user.id);
            Err(AuthError::Banned(user.email).into())
        }
        Some(user) => {
            debug!("Resolved principal {} to user {}", email, user.id);
            Ok(user)
        }
        None => {
            warn!("Authenticated principal has no user record: {}", email);
            Err(AuthError::UnknownUser(email.to_string()).into())
        }
    }
}

/// Like [`resolve_user`], but also requires the admin role.
#[instrument(skip(db))]
pub async fn require_admin(db: &DatabaseConnection, auth: &AuthContext) -> Result<user::Model> {
    let user = resolve_user(db, auth).await?;
    if !user.is_admin() {
        warn!("User {} attempted an admin operation", user.email);
        return Err(AuthError::Forbidden.into());
    }
    Ok(user)
}
