//! stride-crypto: client-side encryption for Stride
//!
//! All user-authored content is sealed on the client before it reaches the
//! record store; the store only ever sees ciphertext blobs next to plaintext
//! metadata.
//!
//! Key lifecycle:
//! ```text
//! Passphrase (user-memorized, never stored in cleartext)
//!   └── Session Key (256-bit, PBKDF2-HMAC-SHA256 over a per-account salt)
//!         ├── Envelope AEAD: AES-256-GCM (96-bit random nonce per seal)
//!         ├── Verification token: sealed marker, proves a candidate key
//!         │   matches the setup-time key without touching real data
//!         └── Recovery bundle: salt + token + account id, exported once
//! ```
//!
//! The session key exists only in memory for the life of a session and is
//! zeroized on drop. The salt and verification token are stored in
//! plaintext with the account settings; neither is secret.

pub mod envelope;
pub mod error;
pub mod kdf;
pub mod policy;
pub mod recovery;
pub mod verify;

pub use envelope::{open, open_bytes, open_json, seal, seal_bytes, seal_json};
pub use error::CryptoError;
pub use kdf::{derive_key, derive_key_with_iterations, generate_salt, SessionKey};
pub use policy::{passphrase_strength, validate_passphrase, PolicyCheck, Requirement};
pub use recovery::{RecoveryBundle, RECOVERY_FILE_NAME};
pub use verify::{create_check, verify};

/// Size of a session key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of a key-derivation salt (128-bit)
pub const SALT_SIZE: usize = 16;

/// Default PBKDF2-HMAC-SHA256 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;
