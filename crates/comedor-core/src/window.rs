//! Access-window predicate gating write operations.
//!
//! Non-administrators may submit or cancel only on weekdays, from the
//! cutover hour through 10:15 of the following morning. Administrators
//! bypass the window entirely.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use comedor_types::Identity;
use std::collections::HashSet;

/// Outcome of evaluating the access window for one identity and instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDecision {
	/// Whether write operations are permitted right now.
	pub allowed: bool,
	/// Whether the identity is an administrator.
	pub is_admin: bool,
}

/// Decides whether write operations are currently permitted.
///
/// The window spans midnight (cutover hour through close time of the next
/// morning), but the weekday gate evaluates the weekday of the *current*
/// calendar day only: the Saturday-morning tail of a Friday-opened window
/// is denied.
pub struct AccessWindow {
	admins: HashSet<Identity>,
	cutover_hour: u32,
	close_hour: u32,
	close_minute: u32,
}

impl AccessWindow {
	/// Creates a window with the given administrator set and bounds.
	pub fn new(
		admins: impl IntoIterator<Item = Identity>,
		cutover_hour: u32,
		close_hour: u32,
		close_minute: u32,
	) -> Self {
		Self {
			admins: admins.into_iter().collect(),
			cutover_hour,
			close_hour,
			close_minute,
		}
	}

	/// Evaluates the window for an identity at a local time.
	///
	/// Administrators are always allowed, weekends included. Pure function
	/// of the configured sets and the given time.
	pub fn evaluate(&self, identity: &Identity, local: NaiveDateTime) -> WindowDecision {
		if self.admins.contains(identity) {
			return WindowDecision {
				allowed: true,
				is_admin: true,
			};
		}

		let is_weekday = !matches!(local.weekday(), Weekday::Sat | Weekday::Sun);
		let (hour, minute) = (local.hour(), local.minute());
		let in_window = hour >= self.cutover_hour
			|| hour < self.close_hour
			|| (hour == self.close_hour && minute <= self.close_minute);

		WindowDecision {
			allowed: is_weekday && in_window,
			is_admin: false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	fn window() -> AccessWindow {
		AccessWindow::new([Identity::from("admin@comedor.local")], 14, 10, 15)
	}

	fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(y, m, d)
			.unwrap()
			.and_hms_opt(hour, minute, 0)
			.unwrap()
	}

	#[test]
	fn test_admin_is_always_allowed() {
		let admin = Identity::from("admin@comedor.local");
		// Saturday 2026-08-08, 03:00
		let decision = window().evaluate(&admin, at(2026, 8, 8, 3, 0));
		assert_eq!(
			decision,
			WindowDecision {
				allowed: true,
				is_admin: true
			}
		);
	}

	#[test]
	fn test_window_opens_at_cutover() {
		let ana = Identity::from("ana@x.com");
		// Monday 2026-08-10
		assert!(window().evaluate(&ana, at(2026, 8, 10, 14, 0)).allowed);
		assert!(!window().evaluate(&ana, at(2026, 8, 10, 13, 59)).allowed);
	}

	#[test]
	fn test_window_closes_at_quarter_past_ten() {
		let ana = Identity::from("ana@x.com");
		// Tuesday 2026-08-11
		assert!(window().evaluate(&ana, at(2026, 8, 11, 10, 15)).allowed);
		assert!(!window().evaluate(&ana, at(2026, 8, 11, 10, 16)).allowed);
	}

	#[test]
	fn test_weekend_is_denied_even_inside_window_hours() {
		let ana = Identity::from("ana@x.com");
		// Saturday 2026-08-08, 15:00
		let decision = window().evaluate(&ana, at(2026, 8, 8, 15, 0));
		assert_eq!(
			decision,
			WindowDecision {
				allowed: false,
				is_admin: false
			}
		);
	}

	#[test]
	fn test_saturday_tail_of_friday_window_is_denied() {
		let ana = Identity::from("ana@x.com");
		// Friday 2026-08-07 opened a window, but Saturday 09:00 checks
		// Saturday's weekday
		assert!(!window().evaluate(&ana, at(2026, 8, 8, 9, 0)).allowed);
	}

	#[test]
	fn test_monday_morning_is_inside_window() {
		let ana = Identity::from("ana@x.com");
		// Monday 2026-08-10, 09:30 — weekday gate checks Monday
		assert!(window().evaluate(&ana, at(2026, 8, 10, 9, 30)).allowed);
	}
}
