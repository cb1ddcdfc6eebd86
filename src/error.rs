use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("Encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Db(_) | AppError::Json(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        let message = match self {
            AppError::Db(_) | AppError::Json(_) => {
                tracing::error!(error = %self, "store failure");
                "Database error"
            }
            AppError::Internal(_) => {
                tracing::error!(error = %self, "internal failure");
                "Internal error"
            }
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Conflict(msg) => {
                tracing::warn!(status = self.status().as_u16(), "{}", msg);
                msg.as_str()
            }
        };
        HttpResponse::build(self.status()).json(&serde_json::json!({ "error": message }))
    }
}

impl From<crate::capture::TransitionError> for AppError {
    fn from(e: crate::capture::TransitionError) -> Self {
        AppError::Conflict(e.to_string())
    }
}

/// Maps a missing row onto a 404 with the given message.
pub fn not_found_on_empty(e: rusqlite::Error, what: &str) -> AppError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("{} not found", what)),
        other => AppError::Db(other),
    }
}
