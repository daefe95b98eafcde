//! Fixtures shared by the service tests.

use chrono::{NaiveDate, NaiveDateTime};
use migration::{Migrator, MigratorTrait};
use model::entities::{cafe, dish, review, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

/// Creates an in-memory SQLite database with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Noon on the given day of March 2024.
pub fn at_day(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Inserts a user whose password column holds a placeholder, not a real hash.
pub async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    role: user::UserRole,
) -> user::Model {
    user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password: Set("not-a-hash".to_string()),
        role: Set(role),
        status: Set(user::UserStatus::Active),
        dob: Set(None),
        created_on: Set(at_day(1)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create user")
}

pub async fn create_cafe(db: &DatabaseConnection, name: &str) -> cafe::Model {
    cafe::ActiveModel {
        name: Set(name.to_string()),
        address: Set(format!("{} street 1", name)),
        description: Set(Some(format!("About {}", name))),
        image: Set(None),
        opening_hours: Set(Some("08:00-20:00".to_string())),
        status: Set(cafe::CafeStatus::Opening),
        created_on: Set(at_day(1)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create cafe")
}

pub async fn create_dish(
    db: &DatabaseConnection,
    cafe_id: i32,
    name: &str,
    price_cents: i64,
) -> dish::Model {
    dish::ActiveModel {
        cafe_id: Set(cafe_id),
        name: Set(name.to_string()),
        price: Set(Decimal::new(price_cents, 2)),
        description: Set(None),
        image: Set(None),
        updated_on: Set(at_day(2)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create dish")
}

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
