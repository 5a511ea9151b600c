use thiserror::Error;

/// Errors from key derivation and envelope operations.
///
/// `Authentication` is the signal that a blob does not verify under the
/// supplied key. At unlock time that means "wrong passphrase"; after
/// unlock it means a corrupt or foreign record. Callers must never treat
/// unauthenticated output as plaintext.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("authentication failed: ciphertext does not verify under this key")]
    Authentication,

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("cipher failure: {0}")]
    Cipher(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
