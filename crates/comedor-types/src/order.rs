//! Order domain types for the comedor service.
//!
//! This module defines the persisted order record, the identifiers it is
//! keyed by, and the derived dish-entry type produced when a cycle's orders
//! are flattened for sequencing.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of dish selections an order must carry.
pub const MIN_DISHES: usize = 1;

/// Maximum number of dish selections an order may carry.
pub const MAX_DISHES: usize = 3;

/// Verified identity of an orderer.
///
/// Wraps the unique email-like string produced by credential verification.
/// Equality on this type is the uniqueness key for orders within a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
	/// Creates an identity from a verified email-like string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the identity as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns the display handle for this identity.
	///
	/// For email-like identities this is the local part before the `@`;
	/// identities without an `@` are returned whole.
	pub fn handle(&self) -> &str {
		self.0.split('@').next().unwrap_or(&self.0)
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for Identity {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

/// Identifier of an ordering cycle.
///
/// A cycle is keyed by the calendar date of the lunch it covers. The only
/// consumer-visible semantics are equality and use as a store filter key;
/// the wire and storage representation is `YYYY-MM-DD`.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CycleId(NaiveDate);

impl CycleId {
	/// Creates a cycle identifier for the given calendar date.
	pub fn new(date: NaiveDate) -> Self {
		Self(date)
	}

	/// Returns the calendar date this cycle covers.
	pub fn date(&self) -> NaiveDate {
		self.0
	}
}

impl fmt::Display for CycleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.format("%Y-%m-%d"))
	}
}

impl FromStr for CycleId {
	type Err = chrono::ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self)
	}
}

/// A persisted meal order.
///
/// At most one record exists per (identity, cycle). A resubmission within
/// the same cycle replaces the record's content and refreshes
/// `submitted_at`, which moves the orderer's dish numbers to the back of
/// the cycle's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
	/// Verified identity of the orderer.
	pub identity: Identity,
	/// Name shown in summaries and statistics.
	pub display_name: String,
	/// Ordered dish selections. Between `MIN_DISHES` and `MAX_DISHES`
	/// entries after validation, none of them empty.
	pub dishes: Vec<String>,
	/// Cycle the order belongs to.
	pub cycle_id: CycleId,
	/// Wall-clock submission time in the service time zone. Only
	/// comparisons within a single cycle are meaningful.
	pub submitted_at: NaiveDateTime,
}

/// One dish slot of a record, flattened for sequencing.
///
/// Derived at read time from the cycle's ordered record set; never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DishEntry {
	/// Name of the ordered dish.
	pub dish: String,
	/// Identity the dish belongs to.
	pub identity: Identity,
	/// Submission time of the owning record.
	pub submitted_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_cycle_id_round_trip() {
		let cycle: CycleId = "2026-08-10".parse().unwrap();
		assert_eq!(cycle.to_string(), "2026-08-10");
		assert_eq!(cycle.date(), NaiveDate::from_ymd_opt(2026, 8, 10).unwrap());
	}

	#[test]
	fn test_cycle_id_rejects_garbage() {
		assert!("not-a-date".parse::<CycleId>().is_err());
	}

	#[test]
	fn test_identity_handle() {
		assert_eq!(Identity::from("ana@x.com").handle(), "ana");
		assert_eq!(Identity::from("no-at-sign").handle(), "no-at-sign");
	}
}
