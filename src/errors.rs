use thiserror::Error;

use crate::adapters::SourceError;
use crate::cipher::CipherError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the portfolio engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Sync source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Credential cipher failed: {0}")]
    Cipher(#[from] CipherError),
}

impl Error {
    /// True when the trigger (scheduler, webhook handler) may retry the
    /// operation without any state having been mutated.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Source(SourceError::Unavailable(_)) | Error::Source(SourceError::RateLimited(_))
        )
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

/// Failures raised by the value store. The in-memory store only produces
/// `Missing`; persistent implementations fold their driver errors into
/// `Internal`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {0}")]
    Missing(String),

    #[error("store failure: {0}")]
    Internal(String),
}
