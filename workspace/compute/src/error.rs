use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Malformed or oversized input caught before any write happens
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The order-creation sequence failed mid-flight and was rolled back.
    /// Carries the underlying cause for diagnosis.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Error from parsing a structured payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error from date operations
    #[error("Date error: {0}")]
    Date(String),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
