//! Statistics endpoint.
//!
//! Read-only aggregate over the active cycle. Authenticated but not gated
//! by the ordering window; store failures surface as a zeroed aggregate
//! with a failure message rather than an error.

use super::verified_identity;
use crate::server::AppState;
use axum::http::HeaderMap;
use comedor_types::{ApiError, StatsResponse};

/// Processes a statistics request over the active cycle.
pub async fn stats(state: &AppState, headers: &HeaderMap) -> Result<StatsResponse, ApiError> {
	verified_identity(state, headers).await?;
	Ok(state.orders.stats().await)
}
