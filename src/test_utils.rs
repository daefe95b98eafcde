#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::session::{SessionStore, SESSION_COOKIE};
    use axum::http::{header::COOKIE, HeaderName, HeaderValue};
    use axum::Router;
    use chrono::{NaiveDate, NaiveDateTime};
    use migration::{Migrator, MigratorTrait};
    use model::entities::{cafe, dish, review, user};
    use sea_orm::prelude::Decimal;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use service::{Registration, UploadStore};
    use std::path::PathBuf;
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const TEST_PASSWORD: &str = "s3cret-pass";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Fresh directory under the system temp dir, not yet created.
    pub fn temp_upload_dir() -> PathBuf {
        std::env::temp_dir().join(format!("cafe-finder-test-{}", uuid::Uuid::new_v4()))
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        AppState::new(
            db,
            SessionStore::new(Duration::from_secs(300)),
            UploadStore::new(temp_upload_dir()),
        )
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG, defaulting to WARN.
    pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();
        create_router(setup_test_app_state().await)
    }

    /// Router plus the state behind it, for tests that seed data.
    pub async fn setup_test_app_with_state() -> (Router, AppState) {
        let _ = init_test_tracing();
        let state = setup_test_app_state().await;
        (create_router(state.clone()), state)
    }

    /// Noon on the given day of March 2024.
    pub fn at_day(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    /// Registers a customer with [`TEST_PASSWORD`].
    pub async fn create_customer(state: &AppState, name: &str, email: &str) -> user::Model {
        state
            .accounts
            .register(Registration::new(name, email, TEST_PASSWORD))
            .await
            .expect("Failed to register customer")
    }

    /// Creates an administrator with [`TEST_PASSWORD`].
    pub async fn create_admin(state: &AppState, name: &str, email: &str) -> user::Model {
        state
            .accounts
            .create_admin(Registration::new(name, email, TEST_PASSWORD))
            .await
            .expect("Failed to create admin")
    }

    pub async fn create_cafe(db: &DatabaseConnection, name: &str) -> cafe::Model {
        cafe::ActiveModel {
            name: Set(name.to_string()),
            address: Set(format!("{} street 1", name)),
            description: Set(Some(format!("About {}", name))),
            image: Set(Some("front.jpg".to_string())),
            opening_hours: Set(Some("08:00-20:00".to_string())),
            status: Set(cafe::CafeStatus::Opening),
            created_on: Set(at_day(1)),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create cafe")
    }

    pub async fn create_dish(db: &DatabaseConnection, cafe_id: i32, name: &str, price_cents: i64) {
        dish::ActiveModel {
            cafe_id: Set(cafe_id),
            name: Set(name.to_string()),
            price: Set(Decimal::new(price_cents, 2)),
            description: Set(Some(format!("House {}", name))),
            image: Set(None),
            updated_on: Set(at_day(2)),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create dish");
    }

    /// Inserts a review with content `"<star> star review on day <day>"`.
    pub async fn create_review(
        db: &DatabaseConnection,
        cafe_id: i32,
        user_id: i32,
        star: i32,
        status: review::ReviewStatus,
        day: u32,
    ) -> review::Model {
        review::ActiveModel {
            cafe_id: Set(cafe_id),
            user_id: Set(user_id),
            star: Set(star),
            content: Set(format!("{} star review on day {}", star, day)),
            status: Set(status),
            created_on: Set(at_day(day)),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create review")
    }

    /// Cookie header for a fresh session of `email`.
    ///
    /// The email does not need a user row, which lets tests cover stale principals.
    pub async fn session_header(state: &AppState, email: &str) -> (HeaderName, HeaderValue) {
        let session_id = state.sessions.create(email).await;
        let value = HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, session_id))
            .expect("Session id is a valid header value");
        (COOKIE, value)
    }
}
