//! This file serves as the root for all SeaORM entity modules.
//! Cafes own their dishes and reviews, users own the reviews they write.

pub mod cafe;
pub mod dish;
pub mod review;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::cafe::Entity as Cafe;
    pub use super::dish::Entity as Dish;
    pub use super::review::Entity as Review;
    pub use super::user::Entity as User;
}
