//! Main entry point for the comedor service.
//!
//! This binary wires the configured store and credential-verifier
//! implementations into the ordering service and exposes it over HTTP.

use clap::Parser;
use comedor_config::Config;
use comedor_core::builder::{ComedorFactories, ServiceBuilder};
use std::path::PathBuf;

mod apis;
mod server;

/// Command-line arguments for the comedor service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the comedor service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the ordering and verification services
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started comedor");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	// Build services with all registered implementations
	let factories = ComedorFactories {
		store_factories: comedor_storage::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect(),
		auth_factories: comedor_auth::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect(),
	};
	let api_config = config.api.clone();
	let (orders, auth) = ServiceBuilder::new(config).build(factories)?;

	let api_config = match api_config {
		Some(api) if api.enabled => api,
		_ => {
			tracing::warn!("API server not enabled in configuration; exiting");
			return Ok(());
		}
	};

	server::start_server(api_config, server::AppState { orders, auth }).await?;

	tracing::info!("Stopped comedor");
	Ok(())
}
