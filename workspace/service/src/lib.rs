pub mod accounts;
pub mod auth;
pub mod cafe_admin;
pub mod cafe_detail;
pub mod error;
pub mod moderation;
pub mod storage;
pub mod user_admin;

#[cfg(test)]
mod testing;

pub use accounts::{AccountService, Registration};
pub use auth::{AuthContext, AuthError};
pub use cafe_admin::CafeAdminService;
pub use cafe_detail::{CafeDetailService, CafeFilter};
pub use error::{Result, ServiceError};
pub use moderation::ModerationService;
pub use storage::UploadStore;
pub use user_admin::{UserAdminService, UserFilter};

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// Largest page a client can request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Keeps a requested page size within `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: u64) -> u64 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}
