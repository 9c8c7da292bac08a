//! Core ordering logic for the comedor service.
//!
//! This module provides the orchestration between the cycle calendar, the
//! access window, the order store and the dish sequencer: one order per
//! identity per cycle, writes gated by the weekly window, and dish numbers
//! recomputed over the cycle's full record set on every read and write.

use crate::calendar::CycleCalendar;
use crate::clock::Clock;
use crate::window::AccessWindow;
use comedor_storage::{StoreError, StoreService};
use comedor_types::{
	Identity, OrderDetails, OrderRecord, StatsResponse, SubmitAction, SubmitResponse, MAX_DISHES,
	MIN_DISHES,
};
use std::sync::Arc;
use thiserror::Error;

pub mod builder;
pub mod calendar;
pub mod clock;
pub mod sequence;
pub mod window;

/// Errors that can occur during ordering operations.
#[derive(Debug, Error)]
pub enum ServiceError {
	/// Write attempted outside the access window by a non-administrator.
	#[error("Access denied: {0}")]
	AccessDenied(String),
	/// Submission content failed validation.
	#[error("Invalid input: {0}")]
	InvalidInput(String),
	/// Underlying store failure.
	#[error("Store error: {0}")]
	Store(String),
}

impl From<StoreError> for ServiceError {
	fn from(err: StoreError) -> Self {
		ServiceError::Store(err.to_string())
	}
}

/// Orchestrates the ordering lifecycle for the active cycle.
///
/// Every operation first resolves the active cycle from the clock; writes
/// additionally consult the access window. Dish numbers are a snapshot
/// derived at request time and shift as later orders arrive.
pub struct OrderService {
	/// Source of the current local time.
	clock: Arc<dyn Clock>,
	/// Cycle-date derivation.
	calendar: CycleCalendar,
	/// Write gating.
	window: AccessWindow,
	/// Durable order records.
	store: Arc<StoreService>,
	/// Static menu, in display order.
	menu: Vec<String>,
}

impl std::fmt::Debug for OrderService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OrderService")
			.field("menu", &self.menu)
			.finish_non_exhaustive()
	}
}

impl OrderService {
	/// Creates a new OrderService over the given collaborators.
	pub fn new(
		clock: Arc<dyn Clock>,
		calendar: CycleCalendar,
		window: AccessWindow,
		store: Arc<StoreService>,
		menu: Vec<String>,
	) -> Self {
		Self {
			clock,
			calendar,
			window,
			store,
			menu,
		}
	}

	/// Returns the configured menu in display order.
	pub fn menu(&self) -> &[String] {
		&self.menu
	}

	/// Creates or replaces the caller's order for the active cycle.
	///
	/// A resubmission within the same cycle replaces the record's content
	/// and refreshes its submission time, moving the caller's dish numbers
	/// to the back of the queue.
	pub async fn submit(
		&self,
		identity: &Identity,
		display_name: &str,
		dishes: &[String],
	) -> Result<SubmitResponse, ServiceError> {
		let now = self.clock.now_local();
		let cycle = self.calendar.cycle_for(now);

		let decision = self.window.evaluate(identity, now);
		if !decision.allowed {
			return Err(ServiceError::AccessDenied(
				"ordering is closed outside the weekly window".to_string(),
			));
		}

		let display_name = display_name.trim();
		if display_name.is_empty() {
			return Err(ServiceError::InvalidInput(
				"display name is required".to_string(),
			));
		}
		let dishes = normalize_dishes(dishes)?;

		let action = match self.store.find(identity, cycle).await? {
			Some(_) => SubmitAction::Updated,
			None => SubmitAction::Created,
		};

		self.store
			.upsert(OrderRecord {
				identity: identity.clone(),
				display_name: display_name.to_string(),
				dishes,
				cycle_id: cycle,
				submitted_at: now,
			})
			.await?;

		let records = self.store.query_cycle(cycle).await?;
		let dish_numbers = sequence::number_dishes(&records)
			.remove(identity)
			.unwrap_or_default();

		tracing::info!(
			identity = %identity.handle(),
			cycle = %cycle,
			action = %action,
			"Order submitted"
		);

		let message = format!(
			"Order {} for {}: dish numbers {}",
			action,
			display_name,
			format_numbers(&dish_numbers)
		);

		Ok(SubmitResponse {
			action,
			dish_numbers,
			message,
		})
	}

	/// Returns the caller's order in the active cycle, if any, with freshly
	/// recomputed dish numbers.
	pub async fn current(&self, identity: &Identity) -> Result<Option<OrderDetails>, ServiceError> {
		let now = self.clock.now_local();
		let cycle = self.calendar.cycle_for(now);

		let record = match self.store.find(identity, cycle).await? {
			Some(record) => record,
			None => return Ok(None),
		};

		let records = self.store.query_cycle(cycle).await?;
		let dish_numbers = sequence::number_dishes(&records)
			.remove(identity)
			.unwrap_or_default();

		Ok(Some(OrderDetails {
			display_name: record.display_name,
			dishes: record.dishes,
			cycle_id: record.cycle_id,
			submitted_at: record.submitted_at,
			dish_numbers,
		}))
	}

	/// Cancels the caller's order in the active cycle.
	///
	/// Cancellation is gated by the access window like submission.
	/// Cancelling when no order exists succeeds.
	pub async fn cancel(&self, identity: &Identity) -> Result<(), ServiceError> {
		let now = self.clock.now_local();
		let cycle = self.calendar.cycle_for(now);

		let decision = self.window.evaluate(identity, now);
		if !decision.allowed {
			return Err(ServiceError::AccessDenied(
				"cancelling is closed outside the weekly window".to_string(),
			));
		}

		self.store.delete(identity, cycle).await?;

		tracing::info!(identity = %identity.handle(), cycle = %cycle, "Order cancelled");
		Ok(())
	}

	/// Returns aggregate statistics over the active cycle.
	///
	/// A store failure degrades to a zero-valued aggregate carrying the
	/// failure message; this operation never errors.
	pub async fn stats(&self) -> StatsResponse {
		let now = self.clock.now_local();
		let cycle = self.calendar.cycle_for(now);

		match self.store.query_cycle(cycle).await {
			Ok(records) => sequence::aggregate_stats(&records),
			Err(e) => {
				tracing::warn!(cycle = %cycle, error = %e, "Statistics degraded to empty aggregate");
				StatsResponse::unavailable(format!("statistics unavailable: {}", e))
			}
		}
	}
}

/// Validates and normalizes the submitted dish selections.
///
/// The first slot is required; later slots are optional and empty ones are
/// dropped while preserving slot order.
fn normalize_dishes(dishes: &[String]) -> Result<Vec<String>, ServiceError> {
	if dishes.len() > MAX_DISHES {
		return Err(ServiceError::InvalidInput(format!(
			"at most {} dishes per order",
			MAX_DISHES
		)));
	}
	if dishes.len() < MIN_DISHES || dishes[0].trim().is_empty() {
		return Err(ServiceError::InvalidInput(
			"the first dish selection is required".to_string(),
		));
	}

	Ok(dishes
		.iter()
		.map(|d| d.trim())
		.filter(|d| !d.is_empty())
		.map(str::to_string)
		.collect())
}

/// Formats dish numbers for the human-readable summary.
fn format_numbers(numbers: &[u32]) -> String {
	numbers
		.iter()
		.map(|n| n.to_string())
		.collect::<Vec<_>>()
		.join(", ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::FixedClock;
	use async_trait::async_trait;
	use chrono::{NaiveDate, NaiveDateTime};
	use comedor_storage::implementations::memory::{MemoryStore, MemoryStoreSchema};
	use comedor_storage::OrderStore;
	use comedor_types::{ConfigSchema, CycleId};

	// 2026-08-10 is a Monday
	fn monday(hour: u32, minute: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2026, 8, 10)
			.unwrap()
			.and_hms_opt(hour, minute, 0)
			.unwrap()
	}

	fn saturday(hour: u32, minute: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2026, 8, 8)
			.unwrap()
			.and_hms_opt(hour, minute, 0)
			.unwrap()
	}

	fn service_with_store(
		at: NaiveDateTime,
		backend: Box<dyn OrderStore>,
	) -> (OrderService, Arc<FixedClock>) {
		let clock = Arc::new(FixedClock::at(at));
		let service = OrderService::new(
			clock.clone(),
			CycleCalendar::new(14),
			AccessWindow::new([Identity::from("admin@comedor.local")], 14, 10, 15),
			Arc::new(StoreService::new(backend)),
			vec!["Tortilla de papa".to_string(), "Ensalada César".to_string()],
		);
		(service, clock)
	}

	fn service_at(at: NaiveDateTime) -> (OrderService, Arc<FixedClock>) {
		service_with_store(at, Box::new(MemoryStore::new()))
	}

	fn dishes(items: &[&str]) -> Vec<String> {
		items.iter().map(|d| d.to_string()).collect()
	}

	#[tokio::test]
	async fn test_submit_end_to_end() {
		let (service, _) = service_at(monday(14, 5));
		let ana = Identity::from("ana@x.com");

		let response = service
			.submit(&ana, "Ana", &dishes(&["Tortilla de papa", "", "Ensalada César"]))
			.await
			.unwrap();

		assert_eq!(response.action, SubmitAction::Created);
		assert_eq!(response.dish_numbers, vec![1, 2]);
		assert!(response.message.contains("1, 2"));

		let details = service.current(&ana).await.unwrap().unwrap();
		assert_eq!(details.dishes, vec!["Tortilla de papa", "Ensalada César"]);
		assert_eq!(details.cycle_id, CycleId::new(NaiveDate::from_ymd_opt(2026, 8, 11).unwrap()));
		assert_eq!(details.dish_numbers, vec![1, 2]);
	}

	#[tokio::test]
	async fn test_submit_outside_window_is_denied() {
		let (service, _) = service_at(monday(13, 59));
		let result = service
			.submit(&Identity::from("ana@x.com"), "Ana", &dishes(&["Guiso"]))
			.await;
		assert!(matches!(result, Err(ServiceError::AccessDenied(_))));
	}

	#[tokio::test]
	async fn test_admin_submits_on_weekend() {
		let (service, _) = service_at(saturday(12, 0));
		let admin = Identity::from("admin@comedor.local");
		let response = service.submit(&admin, "Cocina", &dishes(&["Guiso"])).await.unwrap();
		assert_eq!(response.action, SubmitAction::Created);
	}

	#[tokio::test]
	async fn test_submit_requires_display_name_and_first_dish() {
		let (service, _) = service_at(monday(14, 5));
		let ana = Identity::from("ana@x.com");

		let result = service.submit(&ana, "  ", &dishes(&["Guiso"])).await;
		assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

		let result = service.submit(&ana, "Ana", &dishes(&["", "Guiso"])).await;
		assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

		let result = service.submit(&ana, "Ana", &[]).await;
		assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

		let result = service
			.submit(&ana, "Ana", &dishes(&["a", "b", "c", "d"]))
			.await;
		assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
	}

	#[tokio::test]
	async fn test_resubmit_updates_and_refreshes_timestamp() {
		let (service, clock) = service_at(monday(14, 5));
		let ana = Identity::from("ana@x.com");

		let first = service
			.submit(&ana, "Ana", &dishes(&["Tortilla de papa"]))
			.await
			.unwrap();
		assert_eq!(first.action, SubmitAction::Created);

		clock.set(monday(14, 30));
		let second = service
			.submit(&ana, "Ana", &dishes(&["Tortilla de papa"]))
			.await
			.unwrap();
		assert_eq!(second.action, SubmitAction::Updated);

		let details = service.current(&ana).await.unwrap().unwrap();
		assert_eq!(details.dishes, vec!["Tortilla de papa"]);
		assert_eq!(details.submitted_at, monday(14, 30));
	}

	#[tokio::test]
	async fn test_resubmission_moves_numbers_to_the_back() {
		let (service, clock) = service_at(monday(14, 5));
		let a = Identity::from("a@x.com");
		let b = Identity::from("b@x.com");

		let first = service
			.submit(&a, "A", &dishes(&["Guiso", "Flan"]))
			.await
			.unwrap();
		assert_eq!(first.dish_numbers, vec![1, 2]);

		clock.set(monday(14, 10));
		let second = service.submit(&b, "B", &dishes(&["Tarta"])).await.unwrap();
		assert_eq!(second.dish_numbers, vec![3]);

		clock.set(monday(14, 20));
		let third = service
			.submit(&a, "A", &dishes(&["Guiso", "Flan"]))
			.await
			.unwrap();
		assert_eq!(third.dish_numbers, vec![2, 3]);

		let b_details = service.current(&b).await.unwrap().unwrap();
		assert_eq!(b_details.dish_numbers, vec![1]);
	}

	#[tokio::test]
	async fn test_cancel_is_idempotent() {
		let (service, _) = service_at(monday(14, 5));
		let ana = Identity::from("ana@x.com");

		// No order yet: still succeeds
		service.cancel(&ana).await.unwrap();

		service
			.submit(&ana, "Ana", &dishes(&["Guiso"]))
			.await
			.unwrap();
		service.cancel(&ana).await.unwrap();
		service.cancel(&ana).await.unwrap();

		assert!(service.current(&ana).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_cancel_outside_window_is_denied() {
		let (service, clock) = service_at(monday(14, 5));
		let ana = Identity::from("ana@x.com");
		service
			.submit(&ana, "Ana", &dishes(&["Guiso"]))
			.await
			.unwrap();

		clock.set(monday(12, 0));
		let result = service.cancel(&ana).await;
		assert!(matches!(result, Err(ServiceError::AccessDenied(_))));
	}

	#[tokio::test]
	async fn test_stats_over_active_cycle() {
		let (service, clock) = service_at(monday(14, 5));
		service
			.submit(&Identity::from("a@x.com"), "A", &dishes(&["Guiso", "Flan"]))
			.await
			.unwrap();
		clock.set(monday(14, 10));
		service
			.submit(&Identity::from("b@x.com"), "B", &dishes(&["Flan"]))
			.await
			.unwrap();

		let stats = service.stats().await;
		assert_eq!(stats.total_orders, 2);
		assert_eq!(stats.menu_counts["Flan"], 2);
		assert_eq!(stats.menu_counts["Guiso"], 1);
		let handles: Vec<&str> = stats.people.iter().map(|p| p.handle.as_str()).collect();
		assert_eq!(handles, vec!["a", "b"]);
	}

	struct FailingStore;

	#[async_trait]
	impl OrderStore for FailingStore {
		async fn query_cycle(&self, _cycle: CycleId) -> Result<Vec<OrderRecord>, StoreError> {
			Err(StoreError::Backend("disk offline".to_string()))
		}

		async fn find(
			&self,
			_identity: &Identity,
			_cycle: CycleId,
		) -> Result<Option<OrderRecord>, StoreError> {
			Err(StoreError::Backend("disk offline".to_string()))
		}

		async fn upsert(&self, _record: OrderRecord) -> Result<(), StoreError> {
			Err(StoreError::Backend("disk offline".to_string()))
		}

		async fn delete(&self, _identity: &Identity, _cycle: CycleId) -> Result<(), StoreError> {
			Err(StoreError::Backend("disk offline".to_string()))
		}

		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(MemoryStoreSchema)
		}
	}

	#[tokio::test]
	async fn test_stats_swallow_store_failure() {
		let (service, _) = service_with_store(monday(14, 5), Box::new(FailingStore));

		let stats = service.stats().await;
		assert_eq!(stats.total_orders, 0);
		assert!(stats.menu_counts.is_empty());
		assert!(stats.people.is_empty());
		assert!(stats.message.unwrap().contains("disk offline"));
	}

	#[tokio::test]
	async fn test_submit_surfaces_store_failure() {
		let (service, _) = service_with_store(monday(14, 5), Box::new(FailingStore));
		let result = service
			.submit(&Identity::from("ana@x.com"), "Ana", &dishes(&["Guiso"]))
			.await;
		assert!(matches!(result, Err(ServiceError::Store(_))));
	}
}
