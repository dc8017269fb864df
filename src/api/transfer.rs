use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::ApiResponse,
    services::pipeline::TransferSnapshot,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ParsePromptRequest {
    pub address: String,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    pub address: String,
}

/// POST /api/v1/transfer/parse
pub async fn parse_prompt(
    State(state): State<AppState>,
    Json(body): Json<ParsePromptRequest>,
) -> Result<Json<ApiResponse<TransferSnapshot>>> {
    let address = require_address(&body.address)?;
    let snapshot = state.pipeline.parse(address, &body.prompt).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// POST /api/v1/transfer/sign
pub async fn sign_transfer(
    State(state): State<AppState>,
    Json(body): Json<SignRequest>,
) -> Result<Json<ApiResponse<TransferSnapshot>>> {
    let address = require_address(&body.address)?;
    let snapshot = state.pipeline.sign(address).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// GET /api/v1/transfer/state/{address}
pub async fn get_state(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<TransferSnapshot>>> {
    let address = require_address(&address)?;
    let snapshot = state.pipeline.state(address).await;
    Ok(Json(ApiResponse::success(snapshot)))
}

fn require_address(address: &str) -> Result<&str> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Wallet address is required".to_string()));
    }
    Ok(trimmed)
}
