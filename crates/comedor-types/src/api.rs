//! API types for the comedor HTTP API.
//!
//! This module defines the request and response types for the ordering
//! endpoints, plus the structured API error with its HTTP status mapping.
//! Field names follow the camelCase convention on the wire.

use crate::order::CycleId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Request body for submitting or replacing the caller's order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
	/// Name shown in summaries and statistics.
	#[serde(rename = "displayName")]
	pub display_name: String,
	/// Ordered dish selections. The first entry is required; trailing
	/// entries may be empty strings and are dropped.
	pub dishes: Vec<String>,
}

/// Whether a submission created a new order or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmitAction {
	/// First submission for this identity in the cycle.
	Created,
	/// Resubmission; content and submission time were replaced.
	Updated,
}

impl fmt::Display for SubmitAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SubmitAction::Created => write!(f, "created"),
			SubmitAction::Updated => write!(f, "updated"),
		}
	}
}

/// Response for a successful order submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
	/// Whether the order was created or updated.
	pub action: SubmitAction,
	/// The caller's dish numbers within the cycle, ascending.
	#[serde(rename = "dishNumbers")]
	pub dish_numbers: Vec<u32>,
	/// Human-readable summary of the submission.
	pub message: String,
}

/// The caller's current order with freshly computed dish numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
	/// Name shown in summaries and statistics.
	#[serde(rename = "displayName")]
	pub display_name: String,
	/// Ordered dish selections.
	pub dishes: Vec<String>,
	/// Cycle the order belongs to.
	#[serde(rename = "cycleId")]
	pub cycle_id: CycleId,
	/// Wall-clock submission time in the service time zone.
	#[serde(rename = "submittedAt")]
	pub submitted_at: NaiveDateTime,
	/// The caller's dish numbers within the cycle, ascending.
	#[serde(rename = "dishNumbers")]
	pub dish_numbers: Vec<u32>,
}

/// Response for fetching the caller's current order.
///
/// `order` is absent when the caller has no order in the active cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentOrderResponse {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order: Option<OrderDetails>,
}

/// One orderer in the cycle statistics, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonEntry {
	/// Name shown in summaries and statistics.
	#[serde(rename = "displayName")]
	pub display_name: String,
	/// Handle derived from the identity (local part of the email).
	pub handle: String,
	/// Wall-clock submission time in the service time zone.
	#[serde(rename = "submittedAt")]
	pub submitted_at: NaiveDateTime,
	/// Ordered dish selections.
	pub dishes: Vec<String>,
}

/// Aggregate statistics over all orders of a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
	/// Number of order records in the cycle.
	#[serde(rename = "totalOrders")]
	pub total_orders: u32,
	/// Tally of every non-empty dish slot, keyed by dish name.
	#[serde(rename = "menuCounts")]
	pub menu_counts: BTreeMap<String, u32>,
	/// Orderers in chronological submission order.
	pub people: Vec<PersonEntry>,
	/// Failure message when the aggregate could not be computed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl StatsResponse {
	/// Returns a zero-valued aggregate carrying a failure message.
	///
	/// Used when the store is unreachable so a statistics view degrades
	/// instead of erroring.
	pub fn unavailable(message: impl Into<String>) -> Self {
		Self {
			total_orders: 0,
			menu_counts: BTreeMap::new(),
			people: Vec::new(),
			message: Some(message.into()),
		}
	}
}

/// Acknowledgement for a cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
	/// Human-readable acknowledgement.
	pub message: String,
}

/// Response listing the configured menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuResponse {
	/// Dish names in configured order.
	pub dishes: Vec<String>,
}

/// Response for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
}

impl HealthResponse {
	pub fn ok() -> Self {
		Self {
			status: "ok".to_string(),
		}
	}
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Missing or invalid credential (401).
	Unauthorized { message: String },
	/// Write attempted outside the access window by a non-admin (403).
	Forbidden { message: String },
	/// Invalid submission content (400).
	BadRequest { message: String },
	/// Underlying store failure (500).
	InternalServerError { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::Unauthorized { .. } => 401,
			ApiError::Forbidden { .. } => 403,
			ApiError::BadRequest { .. } => 400,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Get the stable error code reported to clients.
	pub fn error_code(&self) -> &'static str {
		match self {
			ApiError::Unauthorized { .. } => "UNAUTHENTICATED",
			ApiError::Forbidden { .. } => "ACCESS_DENIED",
			ApiError::BadRequest { .. } => "INVALID_INPUT",
			ApiError::InternalServerError { .. } => "STORE_ERROR",
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let message = match self {
			ApiError::Unauthorized { message }
			| ApiError::Forbidden { message }
			| ApiError::BadRequest { message }
			| ApiError::InternalServerError { message } => message.clone(),
		};
		ErrorResponse {
			error: self.error_code().to_string(),
			message,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
			ApiError::Forbidden { message } => write!(f, "Forbidden: {}", message),
			ApiError::BadRequest { message } => write!(f, "Bad Request: {}", message),
			ApiError::InternalServerError { message } => {
				write!(f, "Internal Server Error: {}", message)
			}
		}
	}
}

impl std::error::Error for ApiError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		(status, Json(self.to_error_response())).into_response()
	}
}
