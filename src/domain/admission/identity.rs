//! Caller identity used as the rate-limiting key

use std::fmt;

use serde::Serialize;

/// Composite of caller network origin and presented credential.
///
/// Only used as a rate-limiting key; never persisted beyond the block log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    origin: String,
    credential: String,
}

impl Identity {
    /// Create an identity from a network origin and a credential
    pub fn new(origin: impl Into<String>, credential: impl Into<String>) -> Self {
        let origin = origin.into();

        Self {
            origin: if origin.is_empty() {
                "unknown".to_string()
            } else {
                origin
            },
            credential: credential.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// First four characters of the credential, safe to log or display
    pub fn credential_hint(&self) -> String {
        let prefix: String = self.credential.chars().take(4).collect();
        format!("{}...", prefix)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.origin, self.credential_hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_origin_falls_back_to_unknown() {
        let identity = Identity::new("", "key");
        assert_eq!(identity.origin(), "unknown");
    }

    #[test]
    fn test_identities_differ_by_credential() {
        let a = Identity::new("10.0.0.1", "key-a");
        let b = Identity::new("10.0.0.1", "key-b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_hides_most_of_the_credential() {
        let identity = Identity::new("10.0.0.1", "secret-value");
        assert_eq!(identity.to_string(), "10.0.0.1 (secr...)");
    }
}
