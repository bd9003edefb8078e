//! HTTP server for the teller API.
//!
//! This module provides the HTTP surface over the escrow engine and the
//! signer registry: routing, shared state, and the middleware stack.
//! Request processing itself lives in [`crate::apis`].

use axum::{
	extract::{Path, State},
	response::Json,
	routing::{get, post},
	Router,
};
use std::sync::Arc;
use teller_config::ApiConfig;
use teller_core::Teller;
use teller_types::{
	APIError, AcceptControllerRequest, CancelRequest, ClaimRequest, ClaimWithDepositRequest,
	DepositRequest, DirectClaimRequest, EscrowResponse, RefundRequest, SignersResponse,
	TransferControllerRequest, UpdateSignersRequest,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the assembled teller for processing requests.
	pub teller: Arc<Teller>,
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for the endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	teller: Arc<Teller>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { teller };

	// Build the router with /api base path
	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/deposits", post(handle_deposit))
				.route("/claims", post(handle_claim))
				.route("/claims/with-deposit", post(handle_claim_with_deposit))
				.route("/claims/direct", post(handle_direct_claim))
				.route("/cancellations", post(handle_cancellation))
				.route("/refunds", post(handle_refund))
				.route(
					"/escrows/{giver}/{asset}/{transfer_id}",
					get(handle_get_escrow),
				)
				.route(
					"/signers",
					get(handle_get_signers).post(handle_update_signers),
				)
				.route("/controller/transfer", post(handle_transfer_controller))
				.route("/controller/accept", post(handle_accept_controller)),
		)
		.route("/health", get(handle_health))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Teller API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles GET /health requests.
async fn handle_health() -> Json<serde_json::Value> {
	Json(serde_json::json!({
		"status": "ok",
		"service": "teller",
		"version": env!("CARGO_PKG_VERSION"),
	}))
}

/// Handles POST /api/deposits requests.
async fn handle_deposit(
	State(state): State<AppState>,
	Json(request): Json<DepositRequest>,
) -> Result<Json<EscrowResponse>, APIError> {
	match crate::apis::escrow::process_deposit(request, &state.teller).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Deposit request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/claims requests.
async fn handle_claim(
	State(state): State<AppState>,
	Json(request): Json<ClaimRequest>,
) -> Result<Json<EscrowResponse>, APIError> {
	match crate::apis::escrow::process_claim(request, &state.teller).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Claim request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/claims/with-deposit requests.
async fn handle_claim_with_deposit(
	State(state): State<AppState>,
	Json(request): Json<ClaimWithDepositRequest>,
) -> Result<Json<EscrowResponse>, APIError> {
	match crate::apis::escrow::process_claim_with_deposit(request, &state.teller).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Composed claim request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/claims/direct requests.
async fn handle_direct_claim(
	State(state): State<AppState>,
	Json(request): Json<DirectClaimRequest>,
) -> Result<Json<EscrowResponse>, APIError> {
	match crate::apis::escrow::process_direct_claim(request, &state.teller).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Direct claim request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/cancellations requests.
async fn handle_cancellation(
	State(state): State<AppState>,
	Json(request): Json<CancelRequest>,
) -> Result<Json<EscrowResponse>, APIError> {
	match crate::apis::escrow::process_cancellation(request, &state.teller).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Cancellation request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/refunds requests.
async fn handle_refund(
	State(state): State<AppState>,
	Json(request): Json<RefundRequest>,
) -> Result<Json<EscrowResponse>, APIError> {
	match crate::apis::escrow::process_refund(request, &state.teller).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Refund request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/escrows/{giver}/{asset}/{transfer_id} requests.
async fn handle_get_escrow(
	Path((giver, asset, transfer_id)): Path<(String, String, String)>,
	State(state): State<AppState>,
) -> Result<Json<EscrowResponse>, APIError> {
	match crate::apis::escrow::get_escrow_record(&giver, &asset, &transfer_id, &state.teller).await
	{
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Escrow lookup failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/signers requests.
async fn handle_get_signers(State(state): State<AppState>) -> Json<SignersResponse> {
	Json(crate::apis::signers::get_signer_roster(&state.teller).await)
}

/// Handles POST /api/signers requests.
async fn handle_update_signers(
	State(state): State<AppState>,
	Json(request): Json<UpdateSignersRequest>,
) -> Result<Json<SignersResponse>, APIError> {
	match crate::apis::signers::process_update_signers(request, &state.teller).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Signer update failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/controller/transfer requests.
async fn handle_transfer_controller(
	State(state): State<AppState>,
	Json(request): Json<TransferControllerRequest>,
) -> Result<Json<SignersResponse>, APIError> {
	match crate::apis::signers::process_transfer_controller(request, &state.teller).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Controller transfer failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/controller/accept requests.
async fn handle_accept_controller(
	State(state): State<AppState>,
	Json(request): Json<AcceptControllerRequest>,
) -> Result<Json<SignersResponse>, APIError> {
	match crate::apis::signers::process_accept_controller(request, &state.teller).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Controller acceptance failed: {}", e);
			Err(e)
		},
	}
}
