//! Claim domain - the record an uploaded document is attached to

mod entity;
mod repository;

pub use entity::{Claim, ClaimFilter, ClaimId, ClaimStatus, NewClaim, StoredDocument};
pub use repository::ClaimRepository;

#[cfg(test)]
pub use repository::MockClaimRepository;
