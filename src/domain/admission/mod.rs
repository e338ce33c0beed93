//! Admission control domain types
//!
//! This module provides:
//! - `Identity`, the (network origin, credential) key requests are counted under
//! - `AdmissionPolicy`, the sliding-window limits
//! - `AdmissionDecision` and `BlockEvent`, the outcomes of an admission check

mod decision;
mod identity;

pub use decision::{AdmissionDecision, AdmissionPolicy, BlockEvent, DenialReason};
pub use identity::Identity;
