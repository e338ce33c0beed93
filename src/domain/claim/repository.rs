//! Claim repository trait

use std::fmt::Debug;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Claim, ClaimFilter, ClaimId, ClaimStatus, NewClaim};
use crate::domain::analysis::ParsedFields;
use crate::domain::DomainError;

/// Persistence for claims.
///
/// Every mutating operation is an atomic, immediately visible commit.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClaimRepository: Send + Sync + Debug {
    /// Creates a claim and assigns its id
    async fn create(&self, claim: NewClaim) -> Result<Claim, DomainError>;

    /// Finds a claim by id
    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, DomainError>;

    /// Lists claims matching a filter, ordered by id
    async fn list(&self, filter: ClaimFilter) -> Result<Vec<Claim>, DomainError>;

    /// Claims whose OCR text contains any of the terms (case-insensitive), at most `limit`
    async fn search_ocr_text(
        &self,
        terms: Vec<String>,
        limit: usize,
    ) -> Result<Vec<Claim>, DomainError>;

    /// Sets the status; any status is accepted from any other
    async fn update_status(&self, id: ClaimId, status: ClaimStatus)
        -> Result<Claim, DomainError>;

    /// Deletes a claim, returns true if it existed
    async fn delete(&self, id: ClaimId) -> Result<bool, DomainError>;

    /// Commits the raw extracted transcript
    async fn save_raw_text(&self, id: ClaimId, text: String) -> Result<(), DomainError>;

    /// Overwrites the claim attributes for whichever fields are present
    async fn save_parsed_fields(&self, id: ClaimId, fields: ParsedFields)
        -> Result<(), DomainError>;

    /// Connectivity check
    async fn ping(&self) -> Result<(), DomainError>;
}
