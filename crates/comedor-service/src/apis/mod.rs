//! Endpoint implementations for the comedor API.
//!
//! Each submodule implements the processing behind one group of routes;
//! the shared credential handling lives here.

pub mod orders;
pub mod stats;

use crate::server::AppState;
use axum::http::{header, HeaderMap};
use comedor_types::{ApiError, Identity};

/// Extracts and verifies the bearer credential of a request.
///
/// Verification happens before any business logic; a missing or unknown
/// credential rejects the request with 401.
pub async fn verified_identity(
	state: &AppState,
	headers: &HeaderMap,
) -> Result<Identity, ApiError> {
	let credential = bearer_token(headers)?;
	state
		.auth
		.verify_credential(credential)
		.await
		.map_err(|e| ApiError::Unauthorized {
			message: e.to_string(),
		})
}

/// Reads the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
	let value = headers
		.get(header::AUTHORIZATION)
		.and_then(|v| v.to_str().ok())
		.ok_or_else(|| ApiError::Unauthorized {
			message: "missing Authorization header".to_string(),
		})?;

	value.strip_prefix("Bearer ").ok_or_else(|| ApiError::Unauthorized {
		message: "expected a bearer credential".to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;

	#[test]
	fn test_bearer_token_extraction() {
		let mut headers = HeaderMap::new();
		headers.insert(
			header::AUTHORIZATION,
			HeaderValue::from_static("Bearer token-ana"),
		);
		assert_eq!(bearer_token(&headers).unwrap(), "token-ana");
	}

	#[test]
	fn test_missing_header_is_unauthorized() {
		let headers = HeaderMap::new();
		assert!(matches!(
			bearer_token(&headers),
			Err(ApiError::Unauthorized { .. })
		));
	}

	#[test]
	fn test_non_bearer_scheme_is_unauthorized() {
		let mut headers = HeaderMap::new();
		headers.insert(
			header::AUTHORIZATION,
			HeaderValue::from_static("Basic dXNlcjpwYXNz"),
		);
		assert!(matches!(
			bearer_token(&headers),
			Err(ApiError::Unauthorized { .. })
		));
	}
}
