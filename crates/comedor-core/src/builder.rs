//! Builder for constructing the ordering service from configuration.
//!
//! Composes the clock, calendar, window and the configured store and
//! verifier implementations into ready-to-use services, using factory
//! functions keyed by the implementation names from the configuration.

use crate::calendar::CycleCalendar;
use crate::clock::ZoneClock;
use crate::window::AccessWindow;
use crate::OrderService;
use comedor_auth::{AuthError, AuthInterface, AuthService};
use comedor_config::Config;
use comedor_storage::{OrderStore, StoreError, StoreService};
use comedor_types::Identity;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during service construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Container for the factory functions needed to build the service.
///
/// Each map is keyed by the implementation name used in the configuration
/// file.
pub struct ComedorFactories<SF, AF> {
	pub store_factories: HashMap<String, SF>,
	pub auth_factories: HashMap<String, AF>,
}

/// Builder for the ordering and verification services.
pub struct ServiceBuilder {
	config: Config,
}

impl ServiceBuilder {
	/// Creates a new ServiceBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the ordering and verification services using the given
	/// factories.
	pub fn build<SF, AF>(
		self,
		factories: ComedorFactories<SF, AF>,
	) -> Result<(Arc<OrderService>, Arc<AuthService>), BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn OrderStore>, StoreError>,
		AF: Fn(&toml::Value) -> Result<Box<dyn AuthInterface>, AuthError>,
	{
		let tz = self
			.config
			.service
			.tz()
			.map_err(|e| BuilderError::Config(e.to_string()))?;

		let store_backend = build_implementation(
			"storage",
			&self.config.storage.primary,
			&self.config.storage.implementations,
			&factories.store_factories,
		)?;
		let auth_backend = build_implementation(
			"auth",
			&self.config.auth.primary,
			&self.config.auth.implementations,
			&factories.auth_factories,
		)?;

		let admins = self
			.config
			.admins
			.effective_identities()
			.into_iter()
			.map(Identity::new);

		let service = OrderService::new(
			Arc::new(ZoneClock::new(tz)),
			CycleCalendar::new(self.config.service.cutover_hour),
			AccessWindow::new(
				admins,
				self.config.service.cutover_hour,
				self.config.service.window_close_hour,
				self.config.service.window_close_minute,
			),
			Arc::new(StoreService::new(store_backend)),
			self.config.menu.dishes.clone(),
		);

		Ok((
			Arc::new(service),
			Arc::new(AuthService::new(auth_backend)),
		))
	}
}

/// Creates the primary implementation of one component from its factory.
fn build_implementation<T: ?Sized, E: std::fmt::Display, F>(
	component: &str,
	primary: &str,
	configs: &HashMap<String, toml::Value>,
	factories: &HashMap<String, F>,
) -> Result<Box<T>, BuilderError>
where
	F: Fn(&toml::Value) -> Result<Box<T>, E>,
{
	let implementation_config = configs.get(primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"No configuration for {} implementation '{}'",
			component, primary
		))
	})?;
	let factory = factories.get(primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"No factory registered for {} implementation '{}'",
			component, primary
		))
	})?;

	match factory(implementation_config) {
		Ok(implementation) => {
			tracing::info!(component = %component, implementation = %primary, "Loaded");
			Ok(implementation)
		}
		Err(e) => Err(BuilderError::Config(format!(
			"Failed to create {} implementation '{}': {}",
			component, primary, e
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const CONFIG: &str = r#"
		[service]
		id = "comedor-test"

		[menu]
		dishes = ["Tortilla de papa", "Ensalada César"]

		[auth]
		primary = "static_tokens"
		[auth.implementations.static_tokens]
		tokens = { "token-ana" = "ana@x.com" }

		[storage]
		primary = "memory"
		[storage.implementations.memory]
	"#;

	fn factories() -> ComedorFactories<
		comedor_storage::StoreFactory,
		comedor_auth::AuthFactory,
	> {
		ComedorFactories {
			store_factories: comedor_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			auth_factories: comedor_auth::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_build_from_config() {
		let config = Config::from_str(CONFIG).unwrap();
		let (service, auth) = ServiceBuilder::new(config).build(factories()).unwrap();

		assert_eq!(service.menu(), ["Tortilla de papa", "Ensalada César"]);

		let identity = auth.verify_credential("token-ana").await.unwrap();
		assert_eq!(identity, Identity::from("ana@x.com"));
	}

	#[test]
	fn test_build_rejects_unregistered_implementation() {
		// "redis" passes config validation but has no registered factory
		let raw = CONFIG.replace("memory", "redis");
		let config = Config::from_str(&raw).unwrap();
		let err = ServiceBuilder::new(config).build(factories()).unwrap_err();
		assert!(matches!(err, BuilderError::Config(_)));
	}
}
