//! In-memory claim repository

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::analysis::ParsedFields;
use crate::domain::claim::{Claim, ClaimFilter, ClaimId, ClaimRepository, ClaimStatus, NewClaim};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    claims: BTreeMap<ClaimId, Claim>,
}

/// Thread-safe in-memory claim store
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryClaimRepository {
    inner: RwLock<Inner>,
}

impl InMemoryClaimRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> Result<T, DomainError> {
        let inner = self.inner.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(f(&inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> Result<T, DomainError> {
        let mut inner = self.inner.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;
        Ok(f(&mut inner))
    }

    fn modify(
        &self,
        id: ClaimId,
        f: impl FnOnce(&mut Claim),
    ) -> Result<Claim, DomainError> {
        self.write(|inner| {
            inner.claims.get_mut(&id).map(|claim| {
                f(claim);
                claim.touch();
                claim.clone()
            })
        })?
        .ok_or_else(|| DomainError::not_found(format!("Claim {} not found", id)))
    }
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn create(&self, claim: NewClaim) -> Result<Claim, DomainError> {
        self.write(|inner| {
            inner.next_id += 1;
            let id = ClaimId::new(inner.next_id);
            let claim = Claim::from_new(id, claim);
            inner.claims.insert(id, claim.clone());
            claim
        })
    }

    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, DomainError> {
        self.read(|inner| inner.claims.get(&id).cloned())
    }

    async fn list(&self, filter: ClaimFilter) -> Result<Vec<Claim>, DomainError> {
        self.read(|inner| {
            inner
                .claims
                .values()
                .filter(|c| filter.matches(c))
                .skip(filter.skip)
                .take(filter.limit)
                .cloned()
                .collect()
        })
    }

    async fn search_ocr_text(
        &self,
        terms: Vec<String>,
        limit: usize,
    ) -> Result<Vec<Claim>, DomainError> {
        let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

        self.read(|inner| {
            inner
                .claims
                .values()
                .filter(|c| {
                    c.ocr_text.as_ref().is_some_and(|text| {
                        let text = text.to_lowercase();
                        terms.iter().any(|t| text.contains(t.as_str()))
                    })
                })
                .take(limit)
                .cloned()
                .collect()
        })
    }

    async fn update_status(
        &self,
        id: ClaimId,
        status: ClaimStatus,
    ) -> Result<Claim, DomainError> {
        self.modify(id, |claim| claim.status = status)
    }

    async fn delete(&self, id: ClaimId) -> Result<bool, DomainError> {
        self.write(|inner| inner.claims.remove(&id).is_some())
    }

    async fn save_raw_text(&self, id: ClaimId, text: String) -> Result<(), DomainError> {
        self.modify(id, |claim| claim.ocr_text = Some(text)).map(|_| ())
    }

    async fn save_parsed_fields(
        &self,
        id: ClaimId,
        fields: ParsedFields,
    ) -> Result<(), DomainError> {
        self.modify(id, |claim| {
            if let Some(claim_type) = fields.claim_type {
                claim.claim_type = claim_type;
            }
            if let Some(amount) = fields.amount {
                claim.amount = amount;
            }
        })
        .map(|_| ())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.read(|_| ())
    }
}
