use stride_crypto::CryptoError;
use thiserror::Error;
use uuid::Uuid;

/// Errors from encoding or decoding a single record.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("metadata does not match the {collection} schema: {message}")]
    Meta {
        collection: &'static str,
        message: String,
    },
}

/// A decode failure pinned to the record it came from.
///
/// Batch decoding returns one of these per bad record instead of failing
/// the batch; the session key stays valid and every other record renders
/// normally.
#[derive(Debug, Error)]
#[error("record {id} could not be decoded: {source}")]
pub struct RecordDecodeError {
    pub id: Uuid,
    #[source]
    pub source: CodecError,
}

impl RecordDecodeError {
    /// True when the blob failed authentication: corruption or a blob
    /// sealed under a different key, as opposed to a malformed row.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self.source,
            CodecError::Crypto(CryptoError::Authentication)
        )
    }
}
