//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent defects in the decision tree or in the answers
/// given while walking it. These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed option '{value}' under question '{question_key}': {reason}")]
    MalformedChoice {
        question_key: String,
        value: String,
        reason: String,
    },

    #[error("malformed question '{key}': {reason}")]
    MalformedQuestion { key: String, reason: String },

    #[error("unknown answer '{answer}' for question '{question_key}' (expected one of: {expected})")]
    UnknownAnswer {
        question_key: String,
        answer: String,
        expected: String,
    },

    #[error("answers ended at question '{question_key}' before a recommendation was reached")]
    IncompleteAnswers { question_key: String },

    #[error("{count} answer(s) left over after reaching a recommendation")]
    TrailingAnswers { count: usize },

    #[error("cannot parse decision tree as {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
