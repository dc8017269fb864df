use axum::{extract::State, Json};

use crate::{
    error::{AppError, Result},
    models::{InsertMessage, Message},
};

use super::AppState;

/// GET /api/messages
pub async fn list_messages(State(state): State<AppState>) -> Result<Json<Vec<Message>>> {
    let messages = state.db.get_messages().await?;
    Ok(Json(messages))
}

/// POST /api/messages
pub async fn create_message(
    State(state): State<AppState>,
    Json(body): Json<InsertMessage>,
) -> Result<Json<Message>> {
    validate_message(&body)?;
    let message = state.db.create_message(&body).await?;
    Ok(Json(message))
}

fn validate_message(body: &InsertMessage) -> Result<()> {
    if body.wallet_address.trim().is_empty() || body.content.trim().is_empty() {
        return Err(AppError::BadRequest("Invalid message data".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_message_accepts_filled_body() {
        let body = InsertMessage {
            wallet_address: "0xabc".to_string(),
            content: "hello".to_string(),
        };
        assert!(validate_message(&body).is_ok());
    }

    #[test]
    fn validate_message_rejects_blank_fields() {
        let body = InsertMessage {
            wallet_address: "  ".to_string(),
            content: "hello".to_string(),
        };
        assert!(validate_message(&body).is_err());

        let body = InsertMessage {
            wallet_address: "0xabc".to_string(),
            content: "".to_string(),
        };
        assert!(validate_message(&body).is_err());
    }
}
