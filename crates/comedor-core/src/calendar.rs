//! Cycle-date derivation.
//!
//! Orders placed from the cutover hour onwards are for the next day's
//! lunch; earlier orders belong to the current day. The cutover makes
//! "today's cycle" unambiguous across the midnight boundary.

use chrono::{NaiveDateTime, Timelike};
use comedor_types::CycleId;

/// Maps a local time to the identifier of the active ordering cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleCalendar {
	cutover_hour: u32,
}

impl CycleCalendar {
	/// Creates a calendar with the given cutover hour (0-23).
	pub fn new(cutover_hour: u32) -> Self {
		Self { cutover_hour }
	}

	/// Returns the cycle a local time belongs to.
	///
	/// At or after the cutover hour the cycle is tomorrow's date;
	/// before it, today's. Pure function of its input.
	pub fn cycle_for(&self, local: NaiveDateTime) -> CycleId {
		let date = if local.hour() >= self.cutover_hour {
			local.date() + chrono::Duration::days(1)
		} else {
			local.date()
		};
		CycleId::new(date)
	}
}
