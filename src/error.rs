use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Failures while fetching the flat subtree from the database.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Database query error: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Row decode error: {0}")]
    Decode(#[source] sqlx::Error),
}

/// Failures while turning the flat record set into a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("Root organization not found: {0}")]
    RootMissing(String),

    #[error("Cycle detected at organization {id}")]
    CycleDetected { id: String },

    #[error("Hierarchy deeper than {limit} levels")]
    DepthExceeded { limit: usize },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Assemble(AssembleError::RootMissing(_)) => StatusCode::NOT_FOUND,
            AppError::Retrieval(_) | AppError::Assemble(_) | AppError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Driver details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Retrieval(RetrievalError::Connection(_)) => {
                "Error connecting to the database".to_string()
            }
            AppError::Retrieval(RetrievalError::Query(_)) => "Error querying database".to_string(),
            AppError::Retrieval(RetrievalError::Decode(_)) => "Error scanning row".to_string(),
            AppError::Assemble(AssembleError::RootMissing(id)) => {
                format!("Organization not found: {}", id)
            }
            AppError::Assemble(AssembleError::CycleDetected { id }) => {
                format!("Organization hierarchy contains a cycle at {}", id)
            }
            AppError::Assemble(AssembleError::DepthExceeded { limit }) => {
                format!("Organization hierarchy exceeds maximum depth of {}", limit)
            }
            AppError::Serialization(_) => "Error encoding organization tree".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
