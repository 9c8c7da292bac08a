//! HTTP server for the comedor API.
//!
//! This module provides the HTTP surface over the ordering service:
//! health, menu, the order lifecycle and cycle statistics, all under the
//! `/api` base path.

use crate::apis;
use axum::{
	extract::State,
	http::HeaderMap,
	response::Json,
	routing::get,
	Router,
};
use comedor_auth::AuthService;
use comedor_config::ApiConfig;
use comedor_core::OrderService;
use comedor_types::{
	ApiError, CancelResponse, CurrentOrderResponse, HealthResponse, MenuResponse, StatsResponse,
	SubmitRequest, SubmitResponse,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// The ordering service.
	pub orders: Arc<OrderService>,
	/// The credential verifier.
	pub auth: Arc<AuthService>,
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for the endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/health", get(handle_health))
				.route("/menu", get(handle_menu))
				.route(
					"/order",
					get(handle_current).post(handle_submit).delete(handle_cancel),
				)
				.route("/stats", get(handle_stats)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Comedor API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles GET /api/health requests.
async fn handle_health() -> Json<HealthResponse> {
	Json(HealthResponse::ok())
}

/// Handles GET /api/menu requests.
async fn handle_menu(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<MenuResponse>, ApiError> {
	apis::verified_identity(&state, &headers).await?;
	Ok(Json(MenuResponse {
		dishes: state.orders.menu().to_vec(),
	}))
}

/// Handles POST /api/order requests.
///
/// Creates or replaces the caller's order for the active cycle and returns
/// the freshly computed dish numbers.
async fn handle_submit(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
	match apis::orders::submit(&state, &headers, request).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Order submission failed: {}", e);
			Err(e)
		}
	}
}

/// Handles GET /api/order requests.
async fn handle_current(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<CurrentOrderResponse>, ApiError> {
	match apis::orders::current(&state, &headers).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(e)
		}
	}
}

/// Handles DELETE /api/order requests.
async fn handle_cancel(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<CancelResponse>, ApiError> {
	match apis::orders::cancel(&state, &headers).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Order cancellation failed: {}", e);
			Err(e)
		}
	}
}

/// Handles GET /api/stats requests.
async fn handle_stats(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<StatsResponse>, ApiError> {
	let response = apis::stats::stats(&state, &headers).await?;
	Ok(Json(response))
}
