use stride_crypto::{CryptoError, Requirement};
use stride_records::CodecError;
use stride_store::StoreError;
use thiserror::Error;

/// Errors from session lifecycle operations.
///
/// `Policy` and `Mismatch` are local validation, surfaced field-level and
/// never stored. `WrongPassphrase` is the expected, recoverable unlock
/// failure: clear the field and let the user retry; nothing locks.
/// Post-unlock decode failures do not appear here; they are isolated per
/// record (see `stride_records::RecordDecodeError`).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("passphrase does not meet requirements")]
    Policy { missing: Vec<Requirement> },

    #[error("passphrases do not match")]
    Mismatch,

    #[error("incorrect passphrase")]
    WrongPassphrase,

    #[error("account has no encryption settings yet; run setup first")]
    SetupRequired,

    #[error("account already has encryption settings")]
    AlreadySetUp,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("background task failed: {0}")]
    Internal(String),
}
