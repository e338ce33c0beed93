//! Admission policy and decision types

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Identity;

/// Sliding-window admission policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionPolicy {
    /// Maximum requests admitted per identity within one window
    pub requests_per_window: u32,
    /// Length of the trailing window
    pub window: Duration,
    /// Number of denials retained in the block log
    pub block_log_capacity: usize,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            requests_per_window: 30,
            window: Duration::from_secs(60),
            block_log_capacity: 100,
        }
    }
}

impl AdmissionPolicy {
    pub fn new(requests_per_window: u32, window: Duration) -> Self {
        Self {
            requests_per_window,
            window,
            ..Default::default()
        }
    }

    pub fn with_block_log_capacity(mut self, capacity: usize) -> Self {
        self.block_log_capacity = capacity;
        self
    }
}

/// Why a request was denied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    RateLimitExceeded {
        limit: u32,
        window_secs: u64,
        /// Seconds until the oldest counted request leaves the window
        retry_after_secs: u64,
    },
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimitExceeded { .. } => write!(f, "Rate limit exceeded"),
        }
    }
}

/// Outcome of an admission check
///
/// A denial is an ordinary outcome the caller branches on, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    Allowed {
        /// Requests still available in the current window
        remaining: u32,
    },
    Denied(DenialReason),
}

impl AdmissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// A denied admission attempt, retained in the bounded block log
#[derive(Debug, Clone, Serialize)]
pub struct BlockEvent {
    pub timestamp: DateTime<Utc>,
    pub ip: String,
    /// Redacted to a short prefix; the full credential is never retained
    pub api_key: String,
    pub reason: String,
}

impl BlockEvent {
    pub fn new(identity: &Identity, reason: &DenialReason) -> Self {
        Self {
            timestamp: Utc::now(),
            ip: identity.origin().to_string(),
            api_key: identity.credential_hint(),
            reason: reason.to_string(),
        }
    }
}
