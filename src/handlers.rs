pub mod admin_cafes;
pub mod admin_reviews;
pub mod admin_users;
pub mod auth;
pub mod cafes;
pub mod health;
pub mod pages;
pub mod reviews;
pub mod upload;
