//! Claim repository implementations

mod in_memory;
mod postgres;

pub use in_memory::InMemoryClaimRepository;
pub use postgres::{PostgresClaimRepository, PostgresConfig};
