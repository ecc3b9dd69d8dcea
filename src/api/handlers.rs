//! Request handlers for the gateway routes

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::dispatch::GenerateReply;
use crate::error::Result;
use crate::model::merge::GenerateRequest;
use crate::AppState;

/// `GET /` - liveness probe
pub async fn liveness() -> &'static str {
    "API is alive"
}

/// `GET /queue/:model` - current backlog depth for a class, as plain text
pub async fn queue_depth(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
) -> Result<String> {
    let depth = state.dispatcher.queue_depth(&model).await?;
    Ok(depth.to_string())
}

/// `POST /generate/:model` - submit a generation job and wait for its
/// result.
///
/// The body is optional; a missing or unparseable body is treated as an
/// empty override set.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
    body: Option<Json<GenerateRequest>>,
) -> Result<Json<GenerateReply>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let reply = state.dispatcher.dispatch(&model, request).await?;
    Ok(Json(reply))
}
