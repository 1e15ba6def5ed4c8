use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use async_graphql::{Enum, ErrorExtensions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::StorageError(_) => "STORAGE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
        })
    }
}
impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
impl From<async_graphql::Error> for AppError {
    fn from(err: async_graphql::Error) -> Self {
        AppError::InternalError(err.message)
    }
}
impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_err, e| {
            e.set("code", self.error_code());
        })
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelErrorKind {
    Transport,
    QuotaExceeded,
}

/// Failure of the single outbound call to the generative model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model call failed ({kind:?}): {message}")]
pub struct ModelError {
    pub kind: ModelErrorKind,
    pub message: String,
}

impl ModelError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ModelErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self {
            kind: ModelErrorKind::QuotaExceeded,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no JSON object found in model output")]
pub struct ExtractionFailure;

/// Why the model path could not produce content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    QuotaExceeded,
    ExtractionFailure,
    ParseFailure,
}

#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    #[error("model output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GenerationFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            GenerationFailure::Model(err) => match err.kind {
                ModelErrorKind::Transport => FailureKind::Transport,
                ModelErrorKind::QuotaExceeded => FailureKind::QuotaExceeded,
            },
            GenerationFailure::Extraction(_) => FailureKind::ExtractionFailure,
            GenerationFailure::Parse(_) => FailureKind::ParseFailure,
        }
    }
}
