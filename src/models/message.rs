use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ==================== MESSAGES ====================
// Wire format keeps the camelCase keys the web client already speaks.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i32,
    pub wallet_address: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertMessage {
    pub wallet_address: String,
    pub content: String,
}

// ==================== API ENVELOPE ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_success_sets_flag() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, "ok");
    }

    #[test]
    fn insert_message_accepts_camel_case() {
        let body: InsertMessage =
            serde_json::from_str(r#"{"walletAddress":"0xabc","content":"hi"}"#).unwrap();
        assert_eq!(body.wallet_address, "0xabc");
        assert_eq!(body.content, "hi");
    }
}
