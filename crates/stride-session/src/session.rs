//! The session context object

use secrecy::SecretString;
use stride_crypto::{derive_key_with_iterations, SessionKey};

use crate::error::SessionError;

/// An unlocked session: account id plus the derived key.
///
/// This is the explicit context every codec call takes; there is no
/// global key. The key inside is immutable for the session's lifetime;
/// rotation builds a new `Session` rather than mutating this one.
/// Dropping the session (lock, sign-out, passphrase change) zeroizes the
/// key.
pub struct Session {
    account_id: String,
    key: SessionKey,
}

impl Session {
    pub(crate) fn new(account_id: impl Into<String>, key: SessionKey) -> Self {
        Self {
            account_id: account_id.into(),
            key,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("account_id", &self.account_id)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Run the KDF on the blocking pool.
///
/// Derivation is CPU-bound for most of a second at production iteration
/// counts; this is the suspension point the rest of the session engine
/// awaits on.
pub(crate) async fn derive(
    passphrase: &SecretString,
    salt_b64: &str,
    iterations: u32,
) -> Result<SessionKey, SessionError> {
    let passphrase = passphrase.clone();
    let salt = salt_b64.to_string();

    tokio::task::spawn_blocking(move || derive_key_with_iterations(&passphrase, &salt, iterations))
        .await
        .map_err(|e| SessionError::Internal(e.to_string()))?
        .map_err(SessionError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let session = Session::new("user-1", SessionKey::from_bytes([5u8; 32]));
        let debug = format!("{session:?}");

        assert!(debug.contains("user-1"));
        assert!(debug.contains("REDACTED"));
    }

    #[tokio::test]
    async fn test_derive_matches_sync_derivation() {
        let passphrase = SecretString::from("CorrectHorse12!");
        let salt = stride_crypto::generate_salt();

        let from_pool = derive(&passphrase, &salt, 1_000).await.unwrap();
        let inline = derive_key_with_iterations(&passphrase, &salt, 1_000).unwrap();

        let token = stride_crypto::create_check(&inline).unwrap();
        assert!(stride_crypto::verify(&from_pool, &token));
    }

    #[tokio::test]
    async fn test_derive_propagates_decoding_error() {
        let result = derive(&SecretString::from("x"), "!!! bad salt !!!", 1_000).await;
        assert!(matches!(
            result,
            Err(SessionError::Crypto(stride_crypto::CryptoError::Decoding(_)))
        ));
    }
}
