//! User registration and credential checks.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use common::{ProfileUpdate, UserSummary};
use model::entities::user::{self, UserRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::auth::AuthError;
use crate::error::{Result, ServiceError};

/// Sign-up data as entered by the user.
#[derive(Debug, Clone, Validate)]
pub struct Registration {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8 to 128 characters"))]
    pub password: String,
}

impl Registration {
    /// Trims the name and normalises the email to lower case.
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: normalize_email(email),
            password: password.to_string(),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account view without the password hash.
pub fn user_summary(user: user::Model) -> UserSummary {
    UserSummary {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role.as_str().to_string(),
        status: user.status.as_str().to_string(),
        dob: user.dob,
        created_on: user.created_on,
    }
}

/// Hashes a password into an Argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// Account management on top of the `users` table.
#[derive(Clone, Debug)]
pub struct AccountService {
    db: DatabaseConnection,
}

impl AccountService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?)
    }

    /// Registers a customer account.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<user::Model> {
        self.create_user(registration, UserRole::Customer).await
    }

    /// Creates an administrator account.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn create_admin(&self, registration: Registration) -> Result<user::Model> {
        self.create_user(registration, UserRole::Admin).await
    }

    async fn create_user(&self, registration: Registration, role: UserRole) -> Result<user::Model> {
        registration.validate()?;

        if self.find_by_email(&registration.email).await?.is_some() {
            debug!("Email {} is already registered", registration.email);
            return Err(ServiceError::Conflict(format!(
                "Email '{}' is already registered",
                registration.email
            )));
        }

        self.insert_user(registration, role).await
    }

    /// Inserts without the lookup. A concurrent sign-up for the same email
    /// loses on the unique index and is reported as a conflict.
    async fn insert_user(&self, registration: Registration, role: UserRole) -> Result<user::Model> {
        let password = hash_password(&registration.password)?;
        let email = registration.email.clone();
        let user = user::ActiveModel {
            name: Set(registration.name),
            email: Set(registration.email),
            password: Set(password),
            role: Set(role),
            status: Set(user::UserStatus::Active),
            dob: Set(None),
            created_on: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            ServiceError::from_insert(e, || format!("Email '{}' is already registered", email))
        })?;

        info!("Created {:?} account {} ({})", user.role, user.id, user.email);
        Ok(user)
    }

    /// Returns the user when the email and password match, `None` otherwise.
    ///
    /// A banned account with the right password fails with
    /// [`AuthError::Banned`] so the caller can say why.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<user::Model>> {
        let Some(user) = self.find_by_email(email).await? else {
            debug!("Login attempt for unknown email {}", email);
            return Ok(None);
        };

        if !verify_password(password, &user.password) {
            warn!("Wrong password for user {}", user.id);
            return Ok(None);
        }
        if user.is_banned() {
            warn!("Banned user {} tried to log in", user.id);
            return Err(AuthError::Banned(user.email).into());
        }

        info!("User {} logged in", user.id);
        Ok(Some(user))
    }

    /// Applies a profile update to `user` and returns the stored result.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn update_profile(
        &self,
        user: user::Model,
        update: ProfileUpdate,
    ) -> Result<UserSummary> {
        let update = ProfileUpdate {
            name: update.name.map(|n| n.trim().to_string()),
            dob: update.dob,
        };
        update.validate()?;

        if let Some(dob) = update.dob {
            if dob > Utc::now().date_naive() {
                return Err(ServiceError::Validation(
                    "date of birth must not be in the future".to_string(),
                ));
            }
        }

        let user_id = user.id;
        let mut active: user::ActiveModel = user.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if update.dob.is_some() {
            active.dob = Set(update.dob);
        }
        let saved = active.update(&self.db).await?;

        info!("Profile of user {} updated", user_id);
        Ok(user_summary(saved))
    }
}
