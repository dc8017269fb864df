use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseTransactionRequest {
    pub prompt: Option<String>,
}

/// POST /api/parseTransaction
///
/// Pass-through to the upstream parser: its status code and error text are
/// preserved so callers see the same failure they would get directly.
pub async fn parse_transaction(
    State(state): State<AppState>,
    Json(body): Json<ParseTransactionRequest>,
) -> impl IntoResponse {
    let prompt = body.prompt.unwrap_or_default();
    if prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Missing or invalid prompt" })),
        );
    }

    let upstream = match state
        .http
        .post(&state.config.parser_api_url)
        .json(&serde_json::json!({ "prompt": prompt }))
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("parseTransaction upstream unreachable: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Internal parseTransaction error." })),
            );
        }
    };

    let status = upstream.status();
    if !status.is_success() {
        let error_text = upstream.text().await.unwrap_or_default();
        tracing::warn!("parseTransaction upstream error {}: {}", status, error_text);
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return (status, Json(serde_json::json!({ "error": error_text })));
    }

    match upstream.json::<serde_json::Value>().await {
        Ok(payload) => (StatusCode::OK, Json(payload)),
        Err(e) => {
            tracing::error!("parseTransaction upstream returned invalid JSON: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Internal parseTransaction error." })),
            )
        }
    }
}
