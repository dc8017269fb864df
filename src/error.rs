use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Parser unreachable: {0}")]
    ParserUnreachable(String),

    #[error("Prompt needs clarification: {0}")]
    UnresolvedPrompt(String),

    #[error("Unsupported token: {0}")]
    UnsupportedAsset(String),

    #[error("Invalid amount: {0}")]
    AmountParse(String),

    #[error("No wallet provider available")]
    NoProvider,

    #[error("Account authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Transaction submission failed: {0}")]
    Submission(String),

    #[error("A signature request is already pending")]
    SignInProgress,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Database(ref e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                e.to_string(),
            ),
            AppError::EmptyPrompt => (
                StatusCode::BAD_REQUEST,
                "EMPTY_PROMPT",
                self.to_string(),
            ),
            AppError::ParserUnreachable(ref msg) => (
                StatusCode::BAD_GATEWAY,
                "PARSER_UNREACHABLE",
                msg.clone(),
            ),
            AppError::UnresolvedPrompt(ref msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNRESOLVED_PROMPT",
                msg.clone(),
            ),
            AppError::UnsupportedAsset(_) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_ASSET",
                self.to_string(),
            ),
            AppError::AmountParse(_) => (
                StatusCode::BAD_REQUEST,
                "INVALID_AMOUNT",
                self.to_string(),
            ),
            AppError::NoProvider => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NO_WALLET_PROVIDER",
                "No wallet found! Configure a signing key to submit transactions.".to_string(),
            ),
            AppError::AuthorizationDenied(ref msg) => (
                StatusCode::FORBIDDEN,
                "AUTHORIZATION_DENIED",
                msg.clone(),
            ),
            AppError::Submission(ref msg) => (
                StatusCode::BAD_GATEWAY,
                "SUBMISSION_FAILED",
                msg.clone(),
            ),
            AppError::SignInProgress => (
                StatusCode::CONFLICT,
                "SIGN_IN_PROGRESS",
                self.to_string(),
            ),
            AppError::BadRequest(ref msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
