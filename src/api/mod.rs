//! HTTP surface: claim endpoints, admin view, health checks

pub mod admin;
pub mod claims;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router_with_state;
pub use state::AppState;
