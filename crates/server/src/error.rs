//! HTTP error taxonomy; every failure leaves as `{"error": message}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use engine::AnalyzerError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upstream(String),

    #[error("No function handles {0}")]
    NotFound(String),

    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<AnalyzerError> for ApiError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::InvalidInput(msg) => Self::Validation(msg),
            AnalyzerError::Store(e) => {
                error!("Trade store failure: {}", e);
                Self::Upstream(format!("Error loading trades: {}", e))
            }
            AnalyzerError::Completion(e) => {
                error!("Completion API failure: {}", e);
                Self::Upstream(format!("Error generating coach response: {}", e))
            }
        }
    }
}
