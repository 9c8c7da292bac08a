//! Static token verifier implementation.
//!
//! Maps bearer tokens to verified identities using a table from the
//! configuration file. Suitable for small deployments and testing; a real
//! identity provider can be slotted in behind the same interface.

use crate::{AuthError, AuthFactory, AuthInterface, AuthRegistry};
use async_trait::async_trait;
use comedor_types::{
	ConfigSchema, Field, FieldType, Identity, ImplementationRegistry, Schema, ValidationError,
};
use std::collections::HashMap;

/// Verifier backed by a static token table.
pub struct StaticTokenAuth {
	/// Bearer token to verified identity.
	tokens: HashMap<String, Identity>,
}

impl StaticTokenAuth {
	/// Creates a new verifier from a token table.
	pub fn new(tokens: HashMap<String, Identity>) -> Self {
		Self { tokens }
	}
}

#[async_trait]
impl AuthInterface for StaticTokenAuth {
	async fn verify_credential(&self, credential: &str) -> Result<Identity, AuthError> {
		self.tokens
			.get(credential)
			.cloned()
			.ok_or_else(|| AuthError::Unauthenticated("unknown credential".to_string()))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(StaticTokenAuthSchema)
	}
}

/// Configuration schema for StaticTokenAuth.
pub struct StaticTokenAuthSchema;

impl ConfigSchema for StaticTokenAuthSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new(
				"tokens",
				FieldType::Table(Schema::new(vec![], vec![])),
			)],
			vec![],
		);
		schema.validate(config)
	}
}

/// Registry entry for the static token verifier.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "static_tokens";
	type Factory = AuthFactory;

	fn factory() -> Self::Factory {
		create_auth
	}
}

impl AuthRegistry for Registry {}

/// Factory function to create a static token verifier from configuration.
///
/// Configuration parameters:
/// - `tokens`: table mapping bearer tokens to identity strings
pub fn create_auth(config: &toml::Value) -> Result<Box<dyn AuthInterface>, AuthError> {
	StaticTokenAuthSchema
		.validate(config)
		.map_err(|e| AuthError::Configuration(e.to_string()))?;

	let table = config
		.get("tokens")
		.and_then(|v| v.as_table())
		.ok_or_else(|| AuthError::Configuration("Missing tokens table".to_string()))?;

	let mut tokens = HashMap::new();
	for (token, identity) in table {
		let identity = identity.as_str().ok_or_else(|| {
			AuthError::Configuration(format!("Identity for token '{}' must be a string", token))
		})?;
		if identity.trim().is_empty() {
			return Err(AuthError::Configuration(format!(
				"Identity for token '{}' cannot be empty",
				token
			)));
		}
		tokens.insert(token.clone(), Identity::new(identity));
	}

	Ok(Box::new(StaticTokenAuth::new(tokens)))
}
