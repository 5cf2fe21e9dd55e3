use crate::api::CompletionError;
use persistence::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to load trades: {0}")]
    Store(#[from] DbError),

    #[error("Completion request failed: {0}")]
    Completion(#[from] CompletionError),
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
