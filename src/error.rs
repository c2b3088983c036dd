use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiErrorResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("You have used all your attempts")]
    AttemptsExhausted,

    #[error("All prizes are out of stock")]
    OutOfStock,

    #[error("You have already claimed your reward")]
    AlreadyClaimed,

    #[error("The game has not started yet")]
    GameNotOpen,

    #[error("Visitor not found")]
    UnknownVisitor,

    #[error("No draws to claim")]
    NoDraws,

    #[error("The prize you won is out of stock")]
    StockExhausted,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 对外暴露的错误码（前端按此区分提示）
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InvalidTime(_) => "INVALID_TIME",
            AppError::AttemptsExhausted => "ATTEMPTS_EXHAUSTED",
            AppError::OutOfStock => "OUT_OF_STOCK",
            AppError::AlreadyClaimed => "ALREADY_CLAIMED",
            AppError::GameNotOpen => "GAME_NOT_OPEN",
            AppError::UnknownVisitor => "UNKNOWN_VISITOR",
            AppError::NoDraws => "NO_DRAWS",
            AppError::StockExhausted => "STOCK_EXHAUSTED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized | AppError::JwtError(_) => "UNAUTHORIZED",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::StorageError(_) | AppError::Io(_) | AppError::SerdeJsonError(_) => {
                "STORAGE_ERROR"
            }
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidTime(_)
            | AppError::AttemptsExhausted
            | AppError::OutOfStock
            | AppError::AlreadyClaimed
            | AppError::GameNotOpen
            | AppError::UnknownVisitor
            | AppError::NoDraws
            | AppError::StockExhausted => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized | AppError::AuthError(_) | AppError::JwtError(_) => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg) | AppError::InvalidTime(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::Unauthorized | AppError::JwtError(_) => {
                log::warn!("Unauthorized access: {self}");
                "Unauthorized".to_string()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::StorageError(_) | AppError::Io(_) | AppError::SerdeJsonError(_) => {
                log::error!("Storage error: {self}");
                "Storage error".to_string()
            }
            AppError::InternalError(_) => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code())
            .json(ApiErrorResponse::new(self.error_code(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_errors_are_bad_request() {
        for err in [
            AppError::AttemptsExhausted,
            AppError::OutOfStock,
            AppError::UnknownVisitor,
            AppError::NoDraws,
            AppError::StockExhausted,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::StockExhausted.error_code(), "STOCK_EXHAUSTED");
        assert_eq!(
            AppError::Io(std::io::Error::other("disk")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
