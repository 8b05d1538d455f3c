use thiserror::Error;

/// Fatal configuration problems detected while constructing the engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("total campus square footage must be positive")]
    ZeroCampusArea,
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Input problems that abort a single operation before any write happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("'{value}' is not a valid number for {field}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("'{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("unknown parcel field '{0}'")]
    UnknownField(String),
    #[error("'{0}' is not a valid parcel status")]
    UnknownStatus(String),
    #[error("action description must not be empty")]
    EmptyAction,
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// Error raised by ledger operations.
///
/// Every failure path leaves the parcel table and the enforcement log exactly
/// as they were before the operation began: validation happens before a
/// transaction opens, and storage failures roll the transaction back.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no parcel with id {0}")]
    ParcelNotFound(i64),
    #[error("ledger storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
