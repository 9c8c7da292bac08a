//! Configuration module for the comedor service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files with
//! `${VAR}` environment-variable resolution and validates that all required
//! configuration values are properly set before the service starts.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Administrator identities used when the `[admins]` section is absent or
/// lists no identities.
pub const DEFAULT_ADMIN_IDENTITIES: &[&str] =
	&["admin@comedor.local", "cocina@comedor.local"];

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message without the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the comedor service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// The static lunch menu.
	pub menu: MenuConfig,
	/// Privileged identities that bypass the ordering window.
	#[serde(default)]
	pub admins: AdminsConfig,
	/// Configuration for credential verification.
	pub auth: AuthConfig,
	/// Configuration for the order store backend.
	pub storage: StorageConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
	/// IANA time zone all wall-clock derivations happen in.
	#[serde(default = "default_timezone")]
	pub timezone: String,
	/// Local hour at which the active cycle flips to the next day and the
	/// ordering window opens.
	#[serde(default = "default_cutover_hour")]
	pub cutover_hour: u32,
	/// Local hour at which the ordering window closes the next morning.
	#[serde(default = "default_window_close_hour")]
	pub window_close_hour: u32,
	/// Last minute of the closing hour still inside the window.
	#[serde(default = "default_window_close_minute")]
	pub window_close_minute: u32,
}

impl ServiceConfig {
	/// Parses the configured IANA zone name.
	pub fn tz(&self) -> Result<chrono_tz::Tz, ConfigError> {
		self.timezone.parse::<chrono_tz::Tz>().map_err(|_| {
			ConfigError::Validation(format!("Unknown time zone '{}'", self.timezone))
		})
	}
}

fn default_timezone() -> String {
	"America/Argentina/Buenos_Aires".to_string()
}

fn default_cutover_hour() -> u32 {
	14
}

fn default_window_close_hour() -> u32 {
	10
}

fn default_window_close_minute() -> u32 {
	15
}

/// The static lunch menu.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuConfig {
	/// Dish names in the order they are displayed.
	pub dishes: Vec<String>,
}

/// Privileged identities that bypass the ordering window.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminsConfig {
	/// Identities granted administrator access. Falls back to
	/// `DEFAULT_ADMIN_IDENTITIES` when empty.
	#[serde(default)]
	pub identities: Vec<String>,
}

impl AdminsConfig {
	/// Returns the effective administrator identities.
	pub fn effective_identities(&self) -> Vec<String> {
		if self.identities.is_empty() {
			DEFAULT_ADMIN_IDENTITIES
				.iter()
				.map(|s| s.to_string())
				.collect()
		} else {
			self.identities.clone()
		}
	}
}

/// Configuration for credential verification.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of verifier implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the order store backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of store implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable, and
/// `${VAR_NAME:-default}` with the default when the variable is unset.
/// Input is capped at 1 MiB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path).await?;
		Self::from_str(&raw)
	}

	/// Parses configuration from a TOML string.
	///
	/// Environment variables are resolved before parsing and the result is
	/// validated.
	#[allow(clippy::should_implement_trait)]
	pub fn from_str(raw: &str) -> Result<Self, ConfigError> {
		let resolved = resolve_env_vars(raw)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		self.service.tz()?;

		if self.service.cutover_hour > 23 {
			return Err(ConfigError::Validation(format!(
				"Cutover hour {} must be between 0 and 23",
				self.service.cutover_hour
			)));
		}
		if self.service.window_close_hour >= self.service.cutover_hour {
			return Err(ConfigError::Validation(format!(
				"Window close hour {} must be earlier than the cutover hour {}",
				self.service.window_close_hour, self.service.cutover_hour
			)));
		}
		if self.service.window_close_minute > 59 {
			return Err(ConfigError::Validation(format!(
				"Window close minute {} must be between 0 and 59",
				self.service.window_close_minute
			)));
		}

		if self.menu.dishes.is_empty() {
			return Err(ConfigError::Validation(
				"Menu must list at least one dish".into(),
			));
		}
		if self.menu.dishes.iter().any(|d| d.trim().is_empty()) {
			return Err(ConfigError::Validation(
				"Menu dish names cannot be empty".into(),
			));
		}

		if self.admins.identities.iter().any(|i| i.trim().is_empty()) {
			return Err(ConfigError::Validation(
				"Administrator identities cannot be empty".into(),
			));
		}

		if self.auth.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Auth primary implementation cannot be empty".into(),
			));
		}
		if !self.auth.implementations.contains_key(&self.auth.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary auth '{}' not found in implementations",
				self.auth.primary
			)));
		}

		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		Ok(())
	}
}
