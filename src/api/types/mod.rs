//! Request and response envelopes shared by the HTTP handlers

pub mod error;
pub mod json;
pub mod response;

pub use error::{ApiError, ApiErrorBody};
pub use json::Json;
pub use response::ApiResponse;
