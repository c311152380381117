// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP Basic authentication for the admin endpoints.

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use subtle::ConstantTimeEq;

use crate::config::Settings;

use super::errors::ApiError;

/// Verify admin credentials from the `Authorization: Basic` header.
///
/// Comparison is constant-time on both fields to avoid leaking credential
/// prefixes through timing.
pub fn verify_admin(headers: &HeaderMap, settings: &Settings) -> Result<String, ApiError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::AdminUnauthorized)?;

    let (username, password) = decode_basic(header_value).ok_or(ApiError::AdminUnauthorized)?;

    let username_ok: bool = username
        .as_bytes()
        .ct_eq(settings.admin_username.as_bytes())
        .into();
    let password_ok: bool = password
        .as_bytes()
        .ct_eq(settings.admin_password.as_bytes())
        .into();

    if username_ok && password_ok {
        Ok(username)
    } else {
        Err(ApiError::AdminUnauthorized)
    }
}

fn decode_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn settings() -> Settings {
        let mut settings = Settings::from_env();
        settings.admin_username = "admin".to_string();
        settings.admin_password = "s3cret".to_string();
        settings
    }

    fn basic_header(user: &str, pass: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let encoded = BASE64.encode(format!("{}:{}", user, pass));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", encoded)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_credentials() {
        let user = verify_admin(&basic_header("admin", "s3cret"), &settings()).unwrap();
        assert_eq!(user, "admin");
    }

    #[test]
    fn test_wrong_password() {
        assert!(verify_admin(&basic_header("admin", "wrong"), &settings()).is_err());
    }

    #[test]
    fn test_wrong_username() {
        assert!(verify_admin(&basic_header("root", "s3cret"), &settings()).is_err());
    }

    #[test]
    fn test_missing_header() {
        assert!(verify_admin(&HeaderMap::new(), &settings()).is_err());
    }

    #[test]
    fn test_malformed_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert!(verify_admin(&headers, &settings()).is_err());
    }

    #[test]
    fn test_decode_basic() {
        let encoded = BASE64.encode("user:pa:ss");
        let (user, pass) = decode_basic(&format!("Basic {}", encoded)).unwrap();
        assert_eq!(user, "user");
        // split_once keeps any further colons in the password
        assert_eq!(pass, "pa:ss");
    }
}
