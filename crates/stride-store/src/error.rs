use thiserror::Error;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors at the record store boundary.
///
/// A store failure leaves the session key and any already-decrypted state
/// intact; callers surface it with a retry action and do not retry
/// automatically here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {id} not found in {collection}")]
    NotFound { collection: String, id: Uuid },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("row serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
