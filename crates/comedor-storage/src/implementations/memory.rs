//! In-memory order store implementation.
//!
//! This module provides a memory-based implementation of the OrderStore
//! trait, useful for testing and development scenarios where persistence is
//! not required.

use crate::{OrderStore, StoreError, StoreFactory, StoreRegistry};
use async_trait::async_trait;
use comedor_types::{
	ConfigSchema, CycleId, Identity, ImplementationRegistry, OrderRecord, Schema, ValidationError,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// One stored row with its insertion sequence.
#[derive(Debug, Clone)]
struct Row {
	seq: u64,
	record: OrderRecord,
}

/// Rows of a single cycle.
#[derive(Debug, Default)]
struct CycleRows {
	next_seq: u64,
	rows: HashMap<Identity, Row>,
}

/// In-memory store implementation.
///
/// Rows live in a per-cycle map behind a read-write lock; the write lock
/// makes each upsert atomic with respect to the (identity, cycle)
/// uniqueness invariant. Ties on `submitted_at` are broken by the
/// insertion sequence, assigned when a row is first created.
pub struct MemoryStore {
	cycles: RwLock<HashMap<CycleId, CycleRows>>,
}

impl MemoryStore {
	/// Creates a new MemoryStore instance.
	pub fn new() -> Self {
		Self {
			cycles: RwLock::new(HashMap::new()),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl OrderStore for MemoryStore {
	async fn query_cycle(&self, cycle: CycleId) -> Result<Vec<OrderRecord>, StoreError> {
		let cycles = self.cycles.read().await;
		let mut rows: Vec<Row> = cycles
			.get(&cycle)
			.map(|c| c.rows.values().cloned().collect())
			.unwrap_or_default();
		rows.sort_by(|a, b| {
			(a.record.submitted_at, a.seq).cmp(&(b.record.submitted_at, b.seq))
		});
		Ok(rows.into_iter().map(|r| r.record).collect())
	}

	async fn find(
		&self,
		identity: &Identity,
		cycle: CycleId,
	) -> Result<Option<OrderRecord>, StoreError> {
		let cycles = self.cycles.read().await;
		Ok(cycles
			.get(&cycle)
			.and_then(|c| c.rows.get(identity))
			.map(|r| r.record.clone()))
	}

	async fn upsert(&self, record: OrderRecord) -> Result<(), StoreError> {
		let mut cycles = self.cycles.write().await;
		let cycle_rows = cycles.entry(record.cycle_id).or_default();
		match cycle_rows.rows.get_mut(&record.identity) {
			Some(row) => {
				// Same row: content replaced, insertion sequence kept
				row.record = record;
			}
			None => {
				let seq = cycle_rows.next_seq;
				cycle_rows.next_seq += 1;
				cycle_rows
					.rows
					.insert(record.identity.clone(), Row { seq, record });
			}
		}
		Ok(())
	}

	async fn delete(&self, identity: &Identity, cycle: CycleId) -> Result<(), StoreError> {
		let mut cycles = self.cycles.write().await;
		if let Some(cycle_rows) = cycles.get_mut(&cycle) {
			cycle_rows.rows.remove(identity);
		}
		Ok(())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStoreSchema)
	}
}

/// Configuration schema for MemoryStore.
pub struct MemoryStoreSchema;

impl ConfigSchema for MemoryStoreSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory storage has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry entry for the memory store implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = StoreFactory;

	fn factory() -> Self::Factory {
		create_store
	}
}

impl StoreRegistry for Registry {}

/// Factory function to create a memory store from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_store(config: &toml::Value) -> Result<Box<dyn OrderStore>, StoreError> {
	MemoryStoreSchema
		.validate(config)
		.map_err(|e| StoreError::Configuration(e.to_string()))?;
	Ok(Box::new(MemoryStore::new()))
}
