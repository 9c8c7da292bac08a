//! File-based order store implementation.
//!
//! This module stores each cycle's records as a JSON document on the
//! filesystem, providing simple persistence without external dependencies.
//! Writes go through a temp file and an atomic rename; a mutex serializes
//! mutations so a single identity's create-or-update stays atomic.

use crate::{OrderStore, StoreError, StoreFactory, StoreRegistry};
use async_trait::async_trait;
use comedor_types::{
	ConfigSchema, CycleId, Field, FieldType, Identity, ImplementationRegistry, OrderRecord,
	Schema, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// One stored row with its insertion sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRow {
	seq: u64,
	record: OrderRecord,
}

/// On-disk document holding all rows of one cycle.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CycleDocument {
	next_seq: u64,
	rows: Vec<StoredRow>,
}

/// File-based store implementation.
///
/// Each cycle lives in its own `orders-<date>.json` document under the
/// base path. Ties on `submitted_at` are broken by the insertion sequence,
/// assigned when a row is first created and kept across in-place updates.
pub struct FileStore {
	/// Base directory path for cycle documents.
	base_path: PathBuf,
	/// Serializes read-modify-write cycles on the documents.
	write_lock: Mutex<()>,
}

impl FileStore {
	/// Creates a new FileStore instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self {
			base_path,
			write_lock: Mutex::new(()),
		}
	}

	/// Returns the document path for a cycle.
	fn cycle_path(&self, cycle: CycleId) -> PathBuf {
		self.base_path.join(format!("orders-{}.json", cycle))
	}

	/// Loads a cycle document; a missing file is an empty document.
	async fn load(&self, cycle: CycleId) -> Result<CycleDocument, StoreError> {
		let path = self.cycle_path(cycle);
		let data = match fs::read(&path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Ok(CycleDocument::default())
			}
			Err(e) => return Err(StoreError::Backend(e.to_string())),
		};
		serde_json::from_slice(&data).map_err(|e| StoreError::Serialization(e.to_string()))
	}

	/// Writes a cycle document atomically (temp file + rename).
	async fn save(&self, cycle: CycleId, document: &CycleDocument) -> Result<(), StoreError> {
		let path = self.cycle_path(cycle);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StoreError::Backend(e.to_string()))?;
		}

		let data = serde_json::to_vec_pretty(document)
			.map_err(|e| StoreError::Serialization(e.to_string()))?;

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, data)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?;

		Ok(())
	}
}

#[async_trait]
impl OrderStore for FileStore {
	async fn query_cycle(&self, cycle: CycleId) -> Result<Vec<OrderRecord>, StoreError> {
		let mut document = self.load(cycle).await?;
		document.rows.sort_by(|a, b| {
			(a.record.submitted_at, a.seq).cmp(&(b.record.submitted_at, b.seq))
		});
		Ok(document.rows.into_iter().map(|r| r.record).collect())
	}

	async fn find(
		&self,
		identity: &Identity,
		cycle: CycleId,
	) -> Result<Option<OrderRecord>, StoreError> {
		let document = self.load(cycle).await?;
		Ok(document
			.rows
			.into_iter()
			.find(|r| &r.record.identity == identity)
			.map(|r| r.record))
	}

	async fn upsert(&self, record: OrderRecord) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock().await;

		let cycle = record.cycle_id;
		let mut document = self.load(cycle).await?;
		match document
			.rows
			.iter_mut()
			.find(|r| r.record.identity == record.identity)
		{
			Some(row) => {
				// Same row: content replaced, insertion sequence kept
				row.record = record;
			}
			None => {
				let seq = document.next_seq;
				document.next_seq += 1;
				document.rows.push(StoredRow { seq, record });
			}
		}
		self.save(cycle, &document).await
	}

	async fn delete(&self, identity: &Identity, cycle: CycleId) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock().await;

		let path = self.cycle_path(cycle);
		match fs::try_exists(&path).await {
			Ok(false) => return Ok(()),
			Ok(true) => {}
			Err(e) => return Err(StoreError::Backend(e.to_string())),
		}

		let mut document = self.load(cycle).await?;
		let before = document.rows.len();
		document.rows.retain(|r| &r.record.identity != identity);
		if document.rows.len() == before {
			return Ok(());
		}
		self.save(cycle, &document).await
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStoreSchema)
	}
}

/// Configuration schema for FileStore.
pub struct FileStoreSchema;

impl ConfigSchema for FileStoreSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new("storage_path", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Registry entry for the file store implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StoreFactory;

	fn factory() -> Self::Factory {
		create_store
	}
}

impl StoreRegistry for Registry {}

/// Factory function to create a file store from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for cycle documents (default:
///   "./data/orders")
pub fn create_store(config: &toml::Value) -> Result<Box<dyn OrderStore>, StoreError> {
	FileStoreSchema
		.validate(config)
		.map_err(|e| StoreError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/orders")
		.to_string();

	Ok(Box::new(FileStore::new(PathBuf::from(storage_path))))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	fn cycle() -> CycleId {
		CycleId::new(NaiveDate::from_ymd_opt(2026, 8, 10).unwrap())
	}

	fn record(identity: &str, hour: u32, minute: u32, dishes: &[&str]) -> OrderRecord {
		OrderRecord {
			identity: Identity::from(identity),
			display_name: identity.to_string(),
			dishes: dishes.iter().map(|d| d.to_string()).collect(),
			cycle_id: cycle(),
			submitted_at: NaiveDate::from_ymd_opt(2026, 8, 7)
				.unwrap()
				.and_hms_opt(hour, minute, 0)
				.unwrap(),
		}
	}

	#[tokio::test]
	async fn test_round_trip_and_ordering() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());

		store.upsert(record("b@x.com", 16, 0, &["Guiso"])).await.unwrap();
		store.upsert(record("a@x.com", 14, 5, &["Tarta", "Flan"])).await.unwrap();

		let records = store.query_cycle(cycle()).await.unwrap();
		let identities: Vec<&str> = records.iter().map(|r| r.identity.as_str()).collect();
		assert_eq!(identities, vec!["a@x.com", "b@x.com"]);
	}

	#[tokio::test]
	async fn test_survives_reopen() {
		let dir = tempfile::tempdir().unwrap();
		{
			let store = FileStore::new(dir.path().to_path_buf());
			store.upsert(record("a@x.com", 14, 5, &["Guiso"])).await.unwrap();
		}

		let reopened = FileStore::new(dir.path().to_path_buf());
		let found = reopened
			.find(&Identity::from("a@x.com"), cycle())
			.await
			.unwrap();
		assert_eq!(found.unwrap().dishes, vec!["Guiso"]);
	}

	#[tokio::test]
	async fn test_upsert_replaces_in_place() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());

		store.upsert(record("a@x.com", 14, 5, &["Guiso"])).await.unwrap();
		store.upsert(record("a@x.com", 16, 0, &["Tarta"])).await.unwrap();

		let records = store.query_cycle(cycle()).await.unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].dishes, vec!["Tarta"]);
	}

	#[tokio::test]
	async fn test_delete_without_document_is_ok() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());
		store
			.delete(&Identity::from("ghost@x.com"), cycle())
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_delete_removes_record() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());
		let identity = Identity::from("a@x.com");

		store.upsert(record("a@x.com", 14, 5, &["Guiso"])).await.unwrap();
		store.delete(&identity, cycle()).await.unwrap();

		assert!(store.find(&identity, cycle()).await.unwrap().is_none());
		assert!(store.query_cycle(cycle()).await.unwrap().is_empty());
	}
}
