//! Order endpoints: submit, fetch current, cancel.
//!
//! Thin layer between the HTTP surface and the ordering service: verify
//! the caller, delegate, and map service errors onto HTTP statuses.

use super::verified_identity;
use crate::server::AppState;
use axum::http::HeaderMap;
use comedor_core::ServiceError;
use comedor_types::{
	ApiError, CancelResponse, CurrentOrderResponse, SubmitRequest, SubmitResponse,
};

/// Processes an order submission.
pub async fn submit(
	state: &AppState,
	headers: &HeaderMap,
	request: SubmitRequest,
) -> Result<SubmitResponse, ApiError> {
	let identity = verified_identity(state, headers).await?;
	state
		.orders
		.submit(&identity, &request.display_name, &request.dishes)
		.await
		.map_err(map_service_error)
}

/// Processes a fetch of the caller's current order.
pub async fn current(
	state: &AppState,
	headers: &HeaderMap,
) -> Result<CurrentOrderResponse, ApiError> {
	let identity = verified_identity(state, headers).await?;
	let order = state
		.orders
		.current(&identity)
		.await
		.map_err(map_service_error)?;
	Ok(CurrentOrderResponse { order })
}

/// Processes a cancellation of the caller's current order.
pub async fn cancel(
	state: &AppState,
	headers: &HeaderMap,
) -> Result<CancelResponse, ApiError> {
	let identity = verified_identity(state, headers).await?;
	state
		.orders
		.cancel(&identity)
		.await
		.map_err(map_service_error)?;
	Ok(CancelResponse {
		message: "order cancelled".to_string(),
	})
}

/// Maps ordering errors onto their HTTP representation.
pub(super) fn map_service_error(err: ServiceError) -> ApiError {
	match err {
		ServiceError::AccessDenied(message) => ApiError::Forbidden { message },
		ServiceError::InvalidInput(message) => ApiError::BadRequest { message },
		ServiceError::Store(message) => ApiError::InternalServerError { message },
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_service_error_mapping() {
		assert_eq!(
			map_service_error(ServiceError::AccessDenied("closed".into())).status_code(),
			403
		);
		assert_eq!(
			map_service_error(ServiceError::InvalidInput("no dish".into())).status_code(),
			400
		);
		assert_eq!(
			map_service_error(ServiceError::Store("offline".into())).status_code(),
			500
		);
	}
}
