use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::YearMonth;

/// Errors surfaced by the cost operations. `UserNotFound` is a definite answer
/// from the users service; `UpstreamUnavailable` means no answer was obtained.
#[derive(Debug, Error)]
pub enum CostError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("User does not exist: {0}")]
    UserNotFound(i64),

    #[error("Users service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("userid must be a positive number, got {0}")]
    NonPositiveOwner(i64),

    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(i64),

    #[error("year must be between 1 and 9999, got {0}")]
    YearOutOfRange(i64),

    #[error("description must not be empty")]
    EmptyDescription,

    #[error("category must not be empty")]
    EmptyCategory,

    #[error("sum must be a positive number, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("month passed: {0} is already closed")]
    MonthPassed(YearMonth),

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("report encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("corrupt stored value in {column}: '{value}'")]
    Corrupt { column: &'static str, value: String },
}

pub type CostResult<T> = std::result::Result<T, CostError>;
