//! REST client for the pecha metadata backend

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{AssignCategoryRequest, MetadataFilterRequest};
