//! HTTP request handlers for the agent control API

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::Json as ResponseJson,
};
use lifecycle::{PowerEvent, PowerStateSnapshot};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::middleware::ApiKeyAuth;
use crate::types::*;
use crate::AppState;

// === Power handlers ===

pub async fn invoke_power(
    _auth: ApiKeyAuth,
    State(state): State<Arc<AppState>>,
    Json(request): Json<PowerInvokeRequest>,
) -> Result<ResponseJson<ApiResponse<InvokeAccepted>>, StatusCode> {
    if request.action.is_power_cycle() && state.orchestrator.is_sequence_active() {
        return Ok(ResponseJson(ApiResponse::error(
            "A shutdown/reboot sequence is already in progress".to_string(),
        )));
    }

    let invocation_id = Uuid::new_v4().to_string();
    info!("Power invocation {}: {} ({})", invocation_id, request.action, request.comment);

    let handle = state
        .orchestrator
        .dispatch(PowerEvent::new(request.action, request.comment));

    let id = invocation_id.clone();
    tokio::spawn(async move {
        match handle.await {
            Ok(outcome) => info!("Power invocation {} finished: {:?}", id, outcome),
            Err(e) => error!("Power invocation {} task failed: {}", id, e),
        }
    });

    Ok(ResponseJson(ApiResponse::success_with_data(InvokeAccepted {
        invocation_id,
        action: request.action,
    })))
}

pub async fn abort_power(
    _auth: ApiKeyAuth,
    State(state): State<Arc<AppState>>,
) -> Result<ResponseJson<ApiResponse<AbortResult>>, StatusCode> {
    let aborted = state.orchestrator.abort();
    Ok(ResponseJson(ApiResponse::success_with_data(AbortResult { aborted })))
}

pub async fn power_status(
    _auth: ApiKeyAuth,
    State(state): State<Arc<AppState>>,
) -> Result<ResponseJson<ApiResponse<PowerStatus>>, StatusCode> {
    let orchestrator = &state.orchestrator;
    Ok(ResponseJson(ApiResponse::success_with_data(PowerStatus {
        state: orchestrator.state().snapshot(),
        sequence_active: orchestrator.is_sequence_active(),
        last_attempt: orchestrator.last_attempt(),
    })))
}

// === State flag handlers ===

pub async fn set_updating(
    _auth: ApiKeyAuth,
    State(state): State<Arc<AppState>>,
    Json(request): Json<FlagRequest>,
) -> Result<ResponseJson<ApiResponse<PowerStateSnapshot>>, StatusCode> {
    let flags = state.orchestrator.state();
    info!("Updating flag set to {} via control API", request.value);
    flags.set_updating(request.value);
    Ok(ResponseJson(ApiResponse::success_with_data(flags.snapshot())))
}

pub async fn set_requested(
    _auth: ApiKeyAuth,
    State(state): State<Arc<AppState>>,
    Json(request): Json<FlagRequest>,
) -> Result<ResponseJson<ApiResponse<PowerStateSnapshot>>, StatusCode> {
    let flags = state.orchestrator.state();
    info!("Requested flag set to {} via control API", request.value);
    flags.set_requested(request.value);
    Ok(ResponseJson(ApiResponse::success_with_data(flags.snapshot())))
}
