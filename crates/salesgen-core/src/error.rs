use thiserror::Error;

/// Core error type shared across salesgen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// An email could not be normalized into a pool key.
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    /// A single record violates its own field rules.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// A set of records violates a cross-record invariant.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
}

/// Convenience alias for results returned by salesgen crates.
pub type Result<T> = std::result::Result<T, Error>;
