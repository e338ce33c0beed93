//! Infrastructure layer - External service implementations

pub mod admission;
pub mod claim;
pub mod document;
pub mod extraction;
pub mod logging;
pub mod observability;
pub mod services;
