//! Two-phase persistence of an analysis
//!
//! `RawTextCommit` can only be obtained by durably saving the transcript, and
//! parsed fields can only be committed from the `PendingParse` it produces.
//! A parse result therefore never reaches the store ahead of its raw text.

use crate::domain::analysis::{FieldParser, ParsedFields};
use crate::domain::claim::{ClaimId, ClaimRepository};
use crate::domain::extraction::ExtractedText;
use crate::domain::DomainError;

/// Phase 1 done: the raw transcript is stored on the claim
#[derive(Debug)]
#[must_use]
pub struct RawTextCommit {
    claim_id: ClaimId,
    text: String,
}

/// Fields parsed from a committed transcript, not yet applied
#[derive(Debug)]
#[must_use]
pub struct PendingParse {
    claim_id: ClaimId,
    text: String,
    fields: ParsedFields,
}

/// Final state of a completed two-phase commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedAnalysis {
    pub text: String,
    /// Fields written by phase 2; empty when phase 2 was skipped
    pub updated_fields: ParsedFields,
}

impl RawTextCommit {
    /// Persist the transcript unconditionally
    pub async fn commit(
        repository: &dyn ClaimRepository,
        claim_id: ClaimId,
        text: ExtractedText,
    ) -> Result<Self, DomainError> {
        let text = text.into_string();
        repository.save_raw_text(claim_id, text.clone()).await?;

        Ok(Self { claim_id, text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parse(self, parser: &FieldParser) -> PendingParse {
        let fields = parser.parse(&self.text);

        PendingParse {
            claim_id: self.claim_id,
            text: self.text,
            fields,
        }
    }
}

impl PendingParse {
    pub fn fields(&self) -> &ParsedFields {
        &self.fields
    }

    /// Persist the parsed fields if any were found; otherwise no write happens
    pub async fn commit(
        self,
        repository: &dyn ClaimRepository,
    ) -> Result<CommittedAnalysis, DomainError> {
        if !self.fields.is_empty() {
            repository
                .save_parsed_fields(self.claim_id, self.fields.clone())
                .await?;
        }

        Ok(CommittedAnalysis {
            text: self.text,
            updated_fields: self.fields,
        })
    }
}
