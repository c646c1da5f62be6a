//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("decision tree file not found: {0}")]
    TreeFileNotFound(PathBuf),

    #[error("unsupported decision tree format: {0} (expected .toml or .json)")]
    UnsupportedTreeFormat(PathBuf),

    #[error("questionnaire cancelled at question '{question_key}'")]
    Cancelled { question_key: String },

    #[error("selection failed: {message}")]
    Selection { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
