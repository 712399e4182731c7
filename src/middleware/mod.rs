pub mod response;
pub mod roles;
pub mod service_key;
pub mod session;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::error::ApiError;

pub use response::{ApiResponse, ApiResult};
pub use roles::require_roles;
pub use service_key::require_service_key;
pub use session::require_session;

/// Bearer token from the Authorization header, if the header is present
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    // Auth scheme is case-insensitive
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                Err(ApiError::unauthorized("Empty bearer token"))
            } else {
                Ok(Some(token.to_string()))
            }
        }
        _ => Err(ApiError::unauthorized("Authorization header must use Bearer token format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers).unwrap(), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap().as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap().as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("BEARER abc.def"));
        assert_eq!(bearer_token(&headers).unwrap().as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert!(bearer_token(&headers).is_err());
    }
}
