//! stride-device: device-bound credential cache
//!
//! Optionally keeps the encryption passphrase on a trusted device so
//! unlock can skip re-entry. The stored value is obscured with a
//! reversible transform — this is trust-the-local-device convenience, NOT
//! cryptographic protection, and deliberately shares no code with the
//! envelope cipher so the two trust tiers cannot be confused. User-facing
//! copy must say as much: enabling this trades confidentiality for
//! convenience and belongs on personal devices only.
//!
//! Every failure mode on the read path (missing entry, malformed JSON,
//! account mismatch, failed deobfuscation) is a cache miss, never an
//! error: the caller falls back to prompting for the passphrase.

pub mod cache;
pub mod kv;
pub mod obfuscate;

pub use cache::{DeviceCache, STORAGE_KEY};
pub use kv::{FileKv, KeyValueStore, MemoryKv};
