//! Passphrase verification token
//!
//! A fixed marker string is sealed under the key at setup time and stored
//! in plaintext (as ciphertext) next to the salt. On unlock, a candidate
//! key either opens the token back to the marker (correct passphrase)
//! or fails authentication. This is the only way the client distinguishes
//! "wrong passphrase" from "correct passphrase" before touching real
//! records; once a key is verified, record-level failures mean corruption,
//! not a bad passphrase.

use crate::envelope::{open, seal};
use crate::error::CryptoResult;
use crate::kdf::SessionKey;

/// Versioned marker so future token formats can coexist with v1 tokens.
const MARKER: &str = "STRIDE_VERIFIED_v1";

/// Create the verification token for a freshly derived key.
pub fn create_check(key: &SessionKey) -> CryptoResult<String> {
    seal(MARKER, key)
}

/// True iff `token` opens to the marker under `key`.
///
/// Never returns an error: any authentication or decoding failure is
/// simply a non-match.
pub fn verify(key: &SessionKey, token: &str) -> bool {
    match open(token, key) {
        Ok(plaintext) => plaintext == MARKER,
        Err(_) => false,
    }
}
