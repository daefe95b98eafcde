//! Transport-layer types shared between the service layer and the web
//! handlers. These are read-only projections of the persisted entities.

mod page;

pub use page::Page;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

// ===================== Cafes =====================

/// Cafe as shown on its detail page and in listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CafeSummary {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    /// Image file name, relative to the upload directory.
    pub image: Option<String>,
    pub opening_hours: Option<String>,
    /// `opening` or `closed`.
    pub status: String,
    /// Number of approved reviews.
    pub review_count: u64,
    /// Mean star rating over approved reviews, `None` without reviews.
    pub average_star: Option<f64>,
}

/// Dish row of the cafe menu.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DishSummary {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub description: Option<String>,
    pub image: Option<String>,
    pub updated_on: NaiveDateTime,
}

/// A cafe together with its full menu, as edited by administrators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CafeDetail {
    pub cafe: CafeSummary,
    pub dishes: Vec<DishSummary>,
}

fn non_negative(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

/// Dish fields as entered in the admin menu editor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct DishInput {
    /// Existing dish to update. Dishes without an id are created.
    #[serde(default)]
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "dish name must be 1 to 255 characters"))]
    pub name: String,
    #[schema(value_type = String)]
    #[validate(custom(function = "non_negative", message = "price must not be negative"))]
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Cafe fields as entered in the admin cafe editor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CafeInput {
    #[validate(length(min = 1, max = 255, message = "cafe name must be 1 to 255 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "address must be 1 to 255 characters"))]
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Image file name as returned by the upload endpoint.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    /// `opening` (default) or `closed`.
    #[serde(default)]
    pub status: Option<String>,
    /// Full menu. On update, dishes missing from the list are removed;
    /// leaving the field out keeps the menu unchanged.
    #[serde(default)]
    #[validate(nested)]
    pub dishes: Option<Vec<DishInput>>,
}

// ===================== Users =====================

/// Account as listed for administrators and shown on the profile page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// `customer` or `admin`.
    pub role: String,
    /// `active` or `banned`.
    pub status: String,
    pub dob: Option<NaiveDate>,
    pub created_on: NaiveDateTime,
}

/// Profile fields a user may change. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
}

// ===================== Reviews =====================

/// Publicly visible review.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ReviewSummary {
    pub id: i32,
    pub author_name: String,
    pub star: i32,
    pub content: String,
    pub created_on: NaiveDateTime,
}

/// Review as seen by moderators, including its status and author contact.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AdminReviewSummary {
    pub id: i32,
    pub cafe_id: i32,
    pub user_id: i32,
    pub author_name: String,
    pub author_email: String,
    pub star: i32,
    pub content: String,
    /// One of `pending`, `approved`, `rejected`.
    pub status: String,
    pub created_on: NaiveDateTime,
}

/// Number of reviews in each moderation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ReviewStatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}
