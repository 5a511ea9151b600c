//! Device credential cache
//!
//! One fixed slot per device holding `{"u": accountId, "p": obscured
//! passphrase, "t": epochMillis}`. The read path treats every anomaly as
//! a miss: the worst outcome of a corrupt cache is typing the passphrase
//! again.

use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::kv::KeyValueStore;
use crate::obfuscate::{deobfuscate, obfuscate};

/// Fixed namespace key in the local store.
pub const STORAGE_KEY: &str = "stride_device_auth";

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// Account id the passphrase belongs to.
    u: String,
    /// Obscured passphrase.
    p: String,
    /// Storage time, epoch milliseconds.
    t: i64,
}

/// Device-bound passphrase cache over any [`KeyValueStore`].
pub struct DeviceCache<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> DeviceCache<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Remember the passphrase for this account on this device.
    pub fn store(&self, account_id: &str, passphrase: &SecretString) -> bool {
        let entry = CacheEntry {
            u: account_id.to_string(),
            p: obfuscate(passphrase.expose_secret()),
            t: Utc::now().timestamp_millis(),
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("device cache serialization failed: {e}");
                return false;
            }
        };

        match self.kv.set(STORAGE_KEY, &json) {
            Ok(()) => {
                tracing::debug!(account = account_id, "device credentials stored");
                true
            }
            Err(e) => {
                tracing::warn!("device cache store failed: {e}");
                false
            }
        }
    }

    /// Retrieve the remembered passphrase for this account.
    ///
    /// `None` on every miss: empty slot, unreadable store, malformed
    /// JSON, a different account's entry, or a value that does not
    /// deobfuscate.
    pub fn retrieve(&self, account_id: &str) -> Option<SecretString> {
        let stored = match self.kv.get(STORAGE_KEY) {
            Ok(stored) => stored?,
            Err(e) => {
                tracing::warn!("device cache read failed: {e}");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&stored) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("device cache entry malformed, treating as miss: {e}");
                return None;
            }
        };

        if entry.u != account_id {
            tracing::debug!(account = account_id, "device cache holds another account");
            return None;
        }

        let mut passphrase = deobfuscate(&entry.p)?;
        let secret = SecretString::from(passphrase.clone());
        passphrase.zeroize();

        tracing::debug!(account = account_id, "device cache hit");
        Some(secret)
    }

    /// Whether this device remembers credentials for the account.
    pub fn exists(&self, account_id: &str) -> bool {
        self.retrieve(account_id).is_some()
    }

    /// When the cached credentials were stored, if any slot exists.
    pub fn stored_at(&self) -> Option<DateTime<Utc>> {
        let stored = self.kv.get(STORAGE_KEY).ok()??;
        let entry: CacheEntry = serde_json::from_str(&stored).ok()?;
        Utc.timestamp_millis_opt(entry.t).single()
    }

    /// Forget this device: clear the slot regardless of account.
    pub fn clear(&self) -> bool {
        match self.kv.remove(STORAGE_KEY) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("device cache clear failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    fn cache() -> DeviceCache<MemoryKv> {
        DeviceCache::new(MemoryKv::new())
    }

    #[test]
    fn test_store_retrieve_roundtrip() {
        let cache = cache();
        let passphrase = SecretString::from("CorrectHorse12!");

        assert!(cache.store("user-1", &passphrase));
        let retrieved = cache.retrieve("user-1").expect("cache hit");
        assert_eq!(retrieved.expose_secret(), "CorrectHorse12!");
        assert!(cache.exists("user-1"));
    }

    #[test]
    fn test_retrieve_empty_store_is_none() {
        assert!(cache().retrieve("user-1").is_none());
        assert!(!cache().exists("user-1"));
    }

    #[test]
    fn test_retrieve_garbled_json_is_none() {
        let cache = cache();
        cache.kv.set(STORAGE_KEY, "{{{ definitely not json").unwrap();

        assert!(cache.retrieve("user-1").is_none());
    }

    #[test]
    fn test_retrieve_wrong_account_is_none() {
        let cache = cache();
        cache.store("user-1", &SecretString::from("CorrectHorse12!"));

        assert!(cache.retrieve("user-2").is_none());
        assert!(cache.retrieve("user-1").is_some());
    }

    #[test]
    fn test_retrieve_undeobfuscatable_value_is_none() {
        let cache = cache();
        let entry = r#"{"u":"user-1","p":"!!! not base64 !!!","t":0}"#;
        cache.kv.set(STORAGE_KEY, entry).unwrap();

        assert!(cache.retrieve("user-1").is_none());
    }

    #[test]
    fn test_clear_forgets_device() {
        let cache = cache();
        cache.store("user-1", &SecretString::from("CorrectHorse12!"));

        assert!(cache.clear());
        assert!(cache.retrieve("user-1").is_none());
    }

    #[test]
    fn test_stored_at_reports_timestamp() {
        let cache = cache();
        assert!(cache.stored_at().is_none());

        let before = Utc::now().timestamp_millis();
        cache.store("user-1", &SecretString::from("CorrectHorse12!"));
        let at = cache.stored_at().expect("timestamp");

        assert!(at.timestamp_millis() >= before);
    }

    #[test]
    fn test_passphrase_not_stored_in_cleartext() {
        let cache = cache();
        cache.store("user-1", &SecretString::from("CorrectHorse12!"));

        let raw = cache.kv.get(STORAGE_KEY).unwrap().unwrap();
        assert!(!raw.contains("CorrectHorse12!"));
    }
}
