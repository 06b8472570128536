use axum::http::HeaderMap;
use thiserror::Error;

/// Header carrying the shared admin secret on protected routes.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[derive(Debug, Error, PartialEq)]
pub enum AdminKeyError {
    #[error("Invalid admin key")]
    InvalidAdminKey,
}

/// Gate for the admin routes. The expected key comes from `Config`, which
/// startup already validated as present, so the only failure is a mismatch.
pub fn verify_admin_key(headers: &HeaderMap, expected: &str) -> Result<(), AdminKeyError> {
    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if key == expected => Ok(()),
        _ => Err(AdminKeyError::InvalidAdminKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_key(key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_KEY_HEADER, HeaderValue::from_str(key).unwrap());
        headers
    }

    #[test]
    fn it_accepts_the_configured_key() {
        let headers = headers_with_key("s3cret");

        assert_eq!(verify_admin_key(&headers, "s3cret"), Ok(()));
    }

    #[test]
    fn it_rejects_a_wrong_key() {
        let headers = headers_with_key("nope");

        assert_eq!(
            verify_admin_key(&headers, "s3cret"),
            Err(AdminKeyError::InvalidAdminKey)
        );
    }

    #[test]
    fn it_rejects_a_missing_header() {
        let headers = HeaderMap::new();

        assert_eq!(
            verify_admin_key(&headers, "s3cret"),
            Err(AdminKeyError::InvalidAdminKey)
        );
    }
}
