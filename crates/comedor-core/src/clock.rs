//! Wall-clock abstraction for the ordering logic.
//!
//! All cycle and window decisions are made against the local time of one
//! fixed IANA zone. The trait keeps the ordering logic testable with a
//! controlled clock.

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::sync::Mutex;

/// Source of the current local time in the service time zone.
pub trait Clock: Send + Sync {
	/// Returns the current wall-clock time in the service time zone.
	fn now_local(&self) -> NaiveDateTime;
}

/// Production clock over a fixed IANA time zone.
///
/// Converts the current instant into the zone directly; no string
/// formatting round-trips are involved.
#[derive(Debug, Clone, Copy)]
pub struct ZoneClock {
	tz: Tz,
}

impl ZoneClock {
	/// Creates a clock for the given zone.
	pub fn new(tz: Tz) -> Self {
		Self { tz }
	}
}

impl Clock for ZoneClock {
	fn now_local(&self) -> NaiveDateTime {
		Utc::now().with_timezone(&self.tz).naive_local()
	}
}

/// Clock that reports a fixed, settable time.
///
/// Primarily for testing window and cycle behavior at exact instants.
pub struct FixedClock {
	now: Mutex<NaiveDateTime>,
}

impl FixedClock {
	/// Creates a fixed clock reporting the given time.
	pub fn at(now: NaiveDateTime) -> Self {
		Self {
			now: Mutex::new(now),
		}
	}

	/// Moves the clock to a new time.
	pub fn set(&self, now: NaiveDateTime) {
		*self.now.lock().unwrap() = now;
	}
}

impl Clock for FixedClock {
	fn now_local(&self) -> NaiveDateTime {
		*self.now.lock().unwrap()
	}
}
