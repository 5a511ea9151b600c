//! Envelope encryption/decryption with AES-256-GCM
//!
//! Blob format (then base64-encoded as one unit):
//! ```text
//! [12 bytes: random nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//!
//! The nonce is generated fresh per seal, so two seals of identical
//! plaintext under the same key never produce the same blob. `open`
//! authenticates before returning anything: a blob that does not verify
//! under the supplied key fails with `CryptoError::Authentication`, never
//! with garbage plaintext. This layout is the stored/transmitted unit;
//! any conforming client must preserve it for blobs to stay decryptable.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::SessionKey;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Seal raw bytes under a session key.
///
/// Returns the base64 blob `nonce || ciphertext+tag`.
pub fn seal_bytes(plaintext: &[u8], key: &SessionKey) -> CryptoResult<String> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::Cipher("AES-GCM encryption failed".into()))?;

    let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(combined))
}

/// Open a base64 blob produced by [`seal_bytes`].
pub fn open_bytes(blob: &str, key: &SessionKey) -> CryptoResult<Vec<u8>> {
    let combined = BASE64
        .decode(blob)
        .map_err(|e| CryptoError::Decoding(format!("blob is not valid base64: {e}")))?;

    if combined.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Decoding(format!(
            "blob too short: {} bytes (minimum {})",
            combined.len(),
            NONCE_SIZE + TAG_SIZE
        )));
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::Authentication)
}

/// Seal a UTF-8 string.
pub fn seal(plaintext: &str, key: &SessionKey) -> CryptoResult<String> {
    seal_bytes(plaintext.as_bytes(), key)
}

/// Open a blob to a UTF-8 string.
pub fn open(blob: &str, key: &SessionKey) -> CryptoResult<String> {
    let plaintext = open_bytes(blob, key)?;
    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::Decoding("plaintext is not valid UTF-8".into()))
}

/// Seal a JSON-serializable value.
pub fn seal_json<T: Serialize>(value: &T, key: &SessionKey) -> CryptoResult<String> {
    let json = serde_json::to_vec(value)
        .map_err(|e| CryptoError::Cipher(format!("payload serialization: {e}")))?;
    seal_bytes(&json, key)
}

/// Open a blob to a JSON value. Round-trips with [`seal_json`]:
/// `open_json(seal_json(x)) == x` for any JSON-serializable `x`.
pub fn open_json<T: DeserializeOwned>(blob: &str, key: &SessionKey) -> CryptoResult<T> {
    let plaintext = open_bytes(blob, key)?;
    serde_json::from_slice(&plaintext)
        .map_err(|e| CryptoError::Decoding(format!("payload is not valid JSON: {e}")))
}
