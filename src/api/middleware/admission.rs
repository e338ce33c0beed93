//! Admission control extractor

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

use super::auth::RequireApiKey;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::admission::{AdmissionDecision, Identity};

/// Authenticated request that passed the per-caller rate limit
#[derive(Debug, Clone)]
pub struct Admitted {
    pub identity: Identity,
}

impl FromRequestParts<AppState> for Admitted {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireApiKey(key) = RequireApiKey::from_request_parts(parts, state).await?;
        let identity = Identity::new(peer_ip(parts), key);

        match state.admission.admit(&identity).await {
            AdmissionDecision::Allowed { .. } => Ok(Admitted { identity }),
            AdmissionDecision::Denied(reason) => Err(ApiError::rate_limited(&reason)),
        }
    }
}

/// Peer address of the connection, or an empty string without connect info
/// (`Identity::new` then records the origin as `"unknown"`)
fn peer_ip(parts: &Parts) -> String {
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts() -> Parts {
        let (parts, _) = Request::builder().uri("/claims").body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_identity_origin_without_connect_info_is_unknown() {
        let parts = parts();
        assert_eq!(peer_ip(&parts), "");
        assert_eq!(Identity::new(peer_ip(&parts), "key").origin(), "unknown");
    }

    #[test]
    fn test_identity_origin_from_connect_info() {
        let mut parts = parts();
        parts
            .extensions
            .insert(ConnectInfo("10.0.0.7:4310".parse::<SocketAddr>().unwrap()));

        assert_eq!(peer_ip(&parts), "10.0.0.7");
    }
}
