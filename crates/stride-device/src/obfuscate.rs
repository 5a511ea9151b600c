//! Reversible passphrase obfuscation
//!
//! Byte-reversal plus base64: enough to keep a passphrase from being
//! read over a shoulder in a storage inspector, nothing more. Anyone with
//! the stored value and this source can reverse it; that is the stated
//! trust model for device caching.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Obscure a passphrase for at-rest storage on a trusted device.
pub fn obfuscate(plaintext: &str) -> String {
    let mut bytes = plaintext.as_bytes().to_vec();
    bytes.reverse();
    BASE64.encode(bytes)
}

/// Reverse [`obfuscate`]. `None` if the stored value is not reversible.
pub fn deobfuscate(obscured: &str) -> Option<String> {
    let mut bytes = BASE64.decode(obscured).ok()?;
    bytes.reverse();
    String::from_utf8(bytes).ok()
}
