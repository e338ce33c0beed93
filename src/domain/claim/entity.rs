//! Claim entity and supporting types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Claim identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(i64);

impl ClaimId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ClaimId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Review status of a claim.
///
/// Any status may be set from any other; no transition rules are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ClaimStatus {
    #[default]
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Approved")]
    Approved,
    #[serde(rename = "Rejected")]
    Rejected,
    #[serde(rename = "Under Review")]
    UnderReview,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 4] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::UnderReview,
    ];

    /// Display value, also the stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::UnderReview => "Under Review",
        }
    }

    /// Enum-style name used in filters and status updates
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::UnderReview => "UNDER_REVIEW",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = DomainError;

    /// Accepts either the name (`UNDER_REVIEW`) or the value (`Under Review`), any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();

        Self::ALL
            .into_iter()
            .find(|status| {
                status.name().eq_ignore_ascii_case(wanted)
                    || status.as_str().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|s| s.name()).collect();
                DomainError::validation(format!(
                    "Invalid status '{}'. Must be one of: {:?}",
                    s, names
                ))
            })
    }
}

impl TryFrom<String> for ClaimStatus {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// File metadata recorded when a document is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub path: String,
    pub file_name: String,
    /// Sniffed MIME type
    pub file_type: String,
    pub file_size: u64,
}

/// Data for creating a claim
#[derive(Debug, Clone, PartialEq)]
pub struct NewClaim {
    pub claimant_name: String,
    pub claim_type: String,
    pub amount: f64,
    pub description: Option<String>,
    pub document: Option<StoredDocument>,
}

/// A submitted claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub claimant_name: String,
    pub claim_type: String,
    pub amount: f64,
    pub description: Option<String>,
    pub document_path: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
}

impl Claim {
    /// Build a claim from creation data with a freshly assigned id
    pub fn from_new(id: ClaimId, new: NewClaim) -> Self {
        let now = Utc::now();
        let (document_path, file_name, file_type, file_size) = match new.document {
            Some(doc) => (
                Some(doc.path),
                Some(doc.file_name),
                Some(doc.file_type),
                Some(doc.file_size),
            ),
            None => (None, None, None, None),
        };

        Self {
            id,
            claimant_name: new.claimant_name,
            claim_type: new.claim_type,
            amount: new.amount,
            description: new.description,
            document_path,
            file_name,
            file_type,
            file_size,
            status: ClaimStatus::default(),
            created_at: now,
            updated_at: now,
            ocr_text: None,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Listing filter with pagination
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimFilter {
    pub skip: usize,
    pub limit: usize,
    pub status: Option<ClaimStatus>,
    /// Case-insensitive substring of the claimant name
    pub claimant_name: Option<String>,
}

impl Default for ClaimFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 10,
            status: None,
            claimant_name: None,
        }
    }
}

impl ClaimFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_claimant_name(mut self, name: impl Into<String>) -> Self {
        self.claimant_name = Some(name.into());
        self
    }

    /// Whether a claim passes the status and name filters (pagination excluded)
    pub fn matches(&self, claim: &Claim) -> bool {
        if let Some(status) = self.status {
            if claim.status != status {
                return false;
            }
        }

        if let Some(ref name) = self.claimant_name {
            if !claim
                .claimant_name
                .to_lowercase()
                .contains(&name.to_lowercase())
            {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_claim() -> NewClaim {
        NewClaim {
            claimant_name: "Jane Doe".to_string(),
            claim_type: "Auto".to_string(),
            amount: 250.0,
            description: None,
            document: None,
        }
    }

    #[test]
    fn test_status_parses_names_and_values() {
        assert_eq!("APPROVED".parse::<ClaimStatus>().unwrap(), ClaimStatus::Approved);
        assert_eq!("approved".parse::<ClaimStatus>().unwrap(), ClaimStatus::Approved);
        assert_eq!(
            "under_review".parse::<ClaimStatus>().unwrap(),
            ClaimStatus::UnderReview
        );
        assert_eq!(
            "Under Review".parse::<ClaimStatus>().unwrap(),
            ClaimStatus::UnderReview
        );
        assert!("Escalated".parse::<ClaimStatus>().is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ClaimStatus::UnderReview).unwrap(),
            "\"Under Review\""
        );
        let parsed: ClaimStatus = serde_json::from_str("\"REJECTED\"").unwrap();
        assert_eq!(parsed, ClaimStatus::Rejected);
    }

    #[test]
    fn test_from_new_defaults_to_pending() {
        let claim = Claim::from_new(ClaimId::new(1), new_claim());

        assert_eq!(claim.status, ClaimStatus::Pending);
        assert!(claim.ocr_text.is_none());
        assert!(claim.document_path.is_none());
    }

    #[test]
    fn test_from_new_copies_document_metadata() {
        let mut new = new_claim();
        new.document = Some(StoredDocument {
            path: "uploads/scan.pdf".to_string(),
            file_name: "scan.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            file_size: 1024,
        });

        let claim = Claim::from_new(ClaimId::new(2), new);

        assert_eq!(claim.document_path.as_deref(), Some("uploads/scan.pdf"));
        assert_eq!(claim.file_type.as_deref(), Some("application/pdf"));
        assert_eq!(claim.file_size, Some(1024));
    }

    #[test]
    fn test_filter_matches() {
        let claim = Claim::from_new(ClaimId::new(1), new_claim());

        assert!(ClaimFilter::new().matches(&claim));
        assert!(ClaimFilter::new().with_claimant_name("doe").matches(&claim));
        assert!(!ClaimFilter::new().with_claimant_name("smith").matches(&claim));
        assert!(!ClaimFilter::new()
            .with_status(ClaimStatus::Approved)
            .matches(&claim));
    }
}
