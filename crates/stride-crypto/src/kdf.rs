//! Key derivation: PBKDF2-HMAC-SHA256 passphrase → session key

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::{KEY_SIZE, PBKDF2_ITERATIONS, SALT_SIZE};

/// A 256-bit session key derived from a passphrase and a per-account salt.
///
/// Held only in memory for the life of a session; zeroized on drop. The
/// raw bytes never leave this crate; everything else talks to the key
/// through `seal`/`open`/`verify`.
#[derive(Clone)]
pub struct SessionKey {
    bytes: [u8; KEY_SIZE],
}

impl SessionKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generate a fresh random key-derivation salt, base64-encoded.
///
/// Generated once per account at setup and stored in plaintext with the
/// account settings. Immutable from then on: every derivation for the
/// account reuses it, so the same passphrase always yields the same key.
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    BASE64.encode(salt)
}

/// Derive a session key with the default iteration count.
///
/// Deterministic: equal (passphrase, salt) inputs always produce
/// interchangeable keys. An empty passphrase is accepted here; strength
/// requirements are enforced at the session boundary, where the specific
/// missing requirements can be reported back.
pub fn derive_key(passphrase: &SecretString, salt_b64: &str) -> CryptoResult<SessionKey> {
    derive_key_with_iterations(passphrase, salt_b64, PBKDF2_ITERATIONS)
}

/// Derive a session key with an explicit iteration count.
///
/// The count comes from `CryptoConfig`; lowering it is for tests only.
pub fn derive_key_with_iterations(
    passphrase: &SecretString,
    salt_b64: &str,
    iterations: u32,
) -> CryptoResult<SessionKey> {
    let salt = BASE64
        .decode(salt_b64)
        .map_err(|e| CryptoError::Decoding(format!("salt is not valid base64: {e}")))?;

    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(
        passphrase.expose_secret().as_bytes(),
        &salt,
        iterations,
        &mut key,
    );

    Ok(SessionKey::from_bytes(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Full-strength derivation is deliberately slow; tests use a reduced
    // count the same way production reads it from config.
    const TEST_ITERATIONS: u32 = 1_000;

    #[test]
    fn test_kdf_deterministic() {
        let passphrase = SecretString::from("test-passphrase-123");
        let salt = generate_salt();

        let key1 = derive_key_with_iterations(&passphrase, &salt, TEST_ITERATIONS).unwrap();
        let key2 = derive_key_with_iterations(&passphrase, &salt, TEST_ITERATIONS).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes(), "KDF must be deterministic");
    }

    #[test]
    fn test_kdf_different_passphrases() {
        let salt = generate_salt();

        let key1 =
            derive_key_with_iterations(&SecretString::from("passphrase-a"), &salt, TEST_ITERATIONS)
                .unwrap();
        let key2 =
            derive_key_with_iterations(&SecretString::from("passphrase-b"), &salt, TEST_ITERATIONS)
                .unwrap();

        assert_ne!(
            key1.as_bytes(),
            key2.as_bytes(),
            "different passphrases must produce different keys"
        );
    }

    #[test]
    fn test_kdf_different_salts() {
        let passphrase = SecretString::from("same-passphrase");

        let key1 =
            derive_key_with_iterations(&passphrase, &generate_salt(), TEST_ITERATIONS).unwrap();
        let key2 =
            derive_key_with_iterations(&passphrase, &generate_salt(), TEST_ITERATIONS).unwrap();

        assert_ne!(
            key1.as_bytes(),
            key2.as_bytes(),
            "different salts must produce different keys"
        );
    }

    #[test]
    fn test_kdf_iteration_count_changes_key() {
        let passphrase = SecretString::from("same-passphrase");
        let salt = generate_salt();

        let key1 = derive_key_with_iterations(&passphrase, &salt, 1_000).unwrap();
        let key2 = derive_key_with_iterations(&passphrase, &salt, 2_000).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_malformed_salt_is_decoding_error() {
        let passphrase = SecretString::from("whatever");
        let result = derive_key_with_iterations(&passphrase, "!!! not base64 !!!", TEST_ITERATIONS);

        assert!(matches!(result, Err(CryptoError::Decoding(_))));
    }

    #[test]
    fn test_empty_passphrase_accepted_at_this_layer() {
        // Policy rejection happens at the session boundary, not here.
        let result =
            derive_key_with_iterations(&SecretString::from(""), &generate_salt(), TEST_ITERATIONS);
        assert!(result.is_ok());
    }

    #[test]
    fn test_generated_salts_differ() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let key = SessionKey::from_bytes([7u8; KEY_SIZE]);
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains('7'));
    }
}
