pub mod entities;
pub mod review_query;
pub mod search;

// Re-export tracing for use in this crate
pub use tracing;
