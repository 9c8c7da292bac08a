//! Identity verification module for the comedor service.
//!
//! This module provides the abstraction over credential verification: a
//! bearer credential goes in, a verified email-like identity comes out.
//! The rest of the system treats verification as an opaque capability and
//! only ever sees the resulting identity.

use async_trait::async_trait;
use comedor_types::{ConfigSchema, Identity, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod static_tokens;
}

/// Errors that can occur during credential verification.
#[derive(Debug, Error)]
pub enum AuthError {
	/// Error that occurs when a credential is missing, unknown or invalid.
	#[error("Unauthenticated: {0}")]
	Unauthenticated(String),
	/// Error that occurs when the verifier is misconfigured.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for credential verifiers.
///
/// Implementations map a bearer credential to the verified identity of its
/// holder, or fail with `Unauthenticated`.
#[async_trait]
pub trait AuthInterface: Send + Sync {
	/// Returns the configuration schema for this verifier implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Verifies a bearer credential and returns the holder's identity.
	async fn verify_credential(&self, credential: &str) -> Result<Identity, AuthError>;
}

/// Type alias for verifier factory functions.
pub type AuthFactory = fn(&toml::Value) -> Result<Box<dyn AuthInterface>, AuthError>;

/// Registry trait for verifier implementations.
pub trait AuthRegistry: ImplementationRegistry<Factory = AuthFactory> {}

/// Get all registered verifier implementations.
///
/// Returns a vector of (name, factory) tuples for all available verifier
/// implementations.
pub fn get_all_implementations() -> Vec<(&'static str, AuthFactory)> {
	use implementations::static_tokens;

	vec![(static_tokens::Registry::NAME, static_tokens::Registry::factory())]
}

/// Service that manages credential verification.
///
/// Wraps an underlying verifier implementation behind a stable interface.
pub struct AuthService {
	/// The underlying verifier implementation.
	implementation: Box<dyn AuthInterface>,
}

impl std::fmt::Debug for AuthService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthService").finish_non_exhaustive()
	}
}

impl AuthService {
	/// Creates a new AuthService with the specified implementation.
	pub fn new(implementation: Box<dyn AuthInterface>) -> Self {
		Self { implementation }
	}

	/// Verifies a bearer credential and returns the holder's identity.
	pub async fn verify_credential(&self, credential: &str) -> Result<Identity, AuthError> {
		self.implementation.verify_credential(credential).await
	}

	/// Returns the configuration schema of the underlying implementation.
	pub fn config_schema(&self) -> Box<dyn ConfigSchema> {
		self.implementation.config_schema()
	}
}
