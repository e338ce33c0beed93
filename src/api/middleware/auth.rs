//! API key authentication extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;

const API_KEY_HEADER: &str = "x-api-key";

/// Extractor that requires an `X-API-Key` matching a configured key
#[derive(Debug, Clone)]
pub struct RequireApiKey(pub String);

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = extract_api_key(&parts.headers).unwrap_or_default();

        if key.is_empty() || !state.auth.accepts(&key) {
            debug!(
                key_prefix = %key.chars().take(4).collect::<String>(),
                "Rejected API key"
            );
            return Err(ApiError::forbidden("Invalid or missing API Key"));
        }

        Ok(RequireApiKey(key))
    }
}

fn extract_api_key(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_extract_x_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", " secret-key ".parse().unwrap());

        assert_eq!(extract_api_key(&headers).as_deref(), Some("secret-key"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(extract_api_key(&HeaderMap::new()), None);
    }

    #[test]
    fn test_bearer_is_not_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer secret-key".parse().unwrap());

        assert_eq!(extract_api_key(&headers), None);
    }
}
