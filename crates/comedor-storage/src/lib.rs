//! Order store module for the comedor service.
//!
//! This module provides the abstraction over durable storage of order
//! records, supporting different backend implementations such as in-memory
//! or file-based storage. The store is the single source of truth for the
//! one-record-per-identity-per-cycle invariant.

use async_trait::async_trait;
use comedor_types::{ConfigSchema, CycleId, Identity, ImplementationRegistry, OrderRecord};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// Error that occurs when a requested record is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for order store backends.
///
/// Implementations must guarantee that `upsert` is atomic with respect to
/// the (identity, cycle) uniqueness invariant: concurrent submissions by
/// the same identity never produce duplicate records.
#[async_trait]
pub trait OrderStore: Send + Sync {
	/// Returns all records of a cycle, ordered by `submitted_at` ascending
	/// with ties broken by the record's insertion sequence (assigned at
	/// record creation and kept across in-place updates).
	async fn query_cycle(&self, cycle: CycleId) -> Result<Vec<OrderRecord>, StoreError>;

	/// Returns the record for (identity, cycle), if any.
	async fn find(
		&self,
		identity: &Identity,
		cycle: CycleId,
	) -> Result<Option<OrderRecord>, StoreError>;

	/// Creates or replaces the record keyed by the record's identity and
	/// cycle. A replacement keeps the original insertion sequence.
	async fn upsert(&self, record: OrderRecord) -> Result<(), StoreError>;

	/// Deletes the record for (identity, cycle). Deleting an absent record
	/// is not an error.
	async fn delete(&self, identity: &Identity, cycle: CycleId) -> Result<(), StoreError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for store factory functions.
pub type StoreFactory = fn(&toml::Value) -> Result<Box<dyn OrderStore>, StoreError>;

/// Registry trait for store implementations.
pub trait StoreRegistry: ImplementationRegistry<Factory = StoreFactory> {}

/// Get all registered store implementations.
///
/// Returns a vector of (name, factory) tuples for all available store
/// implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StoreFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level store service used by the ordering logic.
///
/// Wraps a low-level store backend behind a stable interface.
pub struct StoreService {
	/// The underlying store backend implementation.
	backend: Box<dyn OrderStore>,
}

impl StoreService {
	/// Creates a new StoreService with the specified backend.
	pub fn new(backend: Box<dyn OrderStore>) -> Self {
		Self { backend }
	}

	/// Returns all records of a cycle in submission order.
	pub async fn query_cycle(&self, cycle: CycleId) -> Result<Vec<OrderRecord>, StoreError> {
		self.backend.query_cycle(cycle).await
	}

	/// Returns the record for (identity, cycle), if any.
	pub async fn find(
		&self,
		identity: &Identity,
		cycle: CycleId,
	) -> Result<Option<OrderRecord>, StoreError> {
		self.backend.find(identity, cycle).await
	}

	/// Creates or replaces the record for the record's (identity, cycle).
	pub async fn upsert(&self, record: OrderRecord) -> Result<(), StoreError> {
		self.backend.upsert(record).await
	}

	/// Deletes the record for (identity, cycle); absence is not an error.
	pub async fn delete(&self, identity: &Identity, cycle: CycleId) -> Result<(), StoreError> {
		self.backend.delete(identity, cycle).await
	}
}
