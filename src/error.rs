use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = TodoError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode todo file: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode todos: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Todo {0} not found")]
    NotFound(u64),

    #[error("Todo store is no longer running")]
    StoreClosed,
}

impl TodoError {
    pub fn invalid(message: impl Into<String>) -> Self {
        TodoError::InvalidInput(message.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            TodoError::InvalidInput(_) => "invalid_request_error",
            TodoError::NotFound(_) => "not_found_error",
            _ => "api_error",
        }
    }
}

#[derive(Serialize)]
struct JsonError {
    message: String,
    r#type: String,
}

#[derive(Serialize)]
struct JsonErrorWrapper {
    error: JsonError,
}

impl ResponseError for TodoError {
    fn status_code(&self) -> StatusCode {
        match self {
            TodoError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::Io(_)
            | TodoError::Decode(_)
            | TodoError::Encode(_)
            | TodoError::StoreClosed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = JsonErrorWrapper {
            error: JsonError {
                message: self.to_string(),
                r#type: self.kind().to_string(),
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
