//! Chronological dish sequencing and cycle aggregation.
//!
//! Every non-empty dish slot of a cycle's records is flattened, in record
//! order, into a single sequence; positions in that sequence are the dish
//! numbers. The input record set must already be in submission order (the
//! store's `query_cycle` contract), which makes the output deterministic.

use comedor_types::{DishEntry, Identity, OrderRecord, PersonEntry, StatsResponse};
use std::collections::{BTreeMap, HashMap};

/// Flattens every non-empty dish slot of the given records, preserving
/// record order and each record's own slot order.
pub fn flatten_dishes(records: &[OrderRecord]) -> Vec<DishEntry> {
	records
		.iter()
		.flat_map(|record| {
			record
				.dishes
				.iter()
				.filter(|dish| !dish.is_empty())
				.map(move |dish| DishEntry {
					dish: dish.clone(),
					identity: record.identity.clone(),
					submitted_at: record.submitted_at,
				})
		})
		.collect()
}

/// Assigns 1-based sequence numbers to every dish of a cycle and collects
/// each identity's numbers in ascending order.
pub fn number_dishes(records: &[OrderRecord]) -> HashMap<Identity, Vec<u32>> {
	let mut numbers: HashMap<Identity, Vec<u32>> = HashMap::new();
	for (position, entry) in flatten_dishes(records).into_iter().enumerate() {
		numbers
			.entry(entry.identity)
			.or_default()
			.push(position as u32 + 1);
	}
	numbers
}

/// Aggregates a cycle's records into order totals, per-dish tallies and a
/// chronological people list.
pub fn aggregate_stats(records: &[OrderRecord]) -> StatsResponse {
	let mut menu_counts: BTreeMap<String, u32> = BTreeMap::new();
	for entry in flatten_dishes(records) {
		*menu_counts.entry(entry.dish).or_insert(0) += 1;
	}

	let people = records
		.iter()
		.map(|record| PersonEntry {
			display_name: record.display_name.clone(),
			handle: record.identity.handle().to_string(),
			submitted_at: record.submitted_at,
			dishes: record.dishes.clone(),
		})
		.collect();

	StatsResponse {
		total_orders: records.len() as u32,
		menu_counts,
		people,
		message: None,
	}
}
