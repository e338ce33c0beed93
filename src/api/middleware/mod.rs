//! API middleware components

pub mod admission;
pub mod auth;
pub mod logging;
pub mod metrics;

pub use admission::Admitted;
pub use auth::RequireApiKey;
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
