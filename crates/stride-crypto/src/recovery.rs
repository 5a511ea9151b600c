//! Recovery bundle: exported salt + verification token
//!
//! The bundle lets a user who still knows their passphrase re-establish
//! access when local state is lost — it is not a password reset token and
//! grants nothing without the passphrase. Built once at setup and handed
//! to the user as a JSON file; the salt and token it carries already live
//! in the account settings, so nothing secret leaves the client.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CryptoError, CryptoResult};

/// Fixed filename for the exported bundle.
pub const RECOVERY_FILE_NAME: &str = "stride-recovery.json";

const APP_NAME: &str = "Stride";
const BUNDLE_VERSION: u32 = 1;
const WARNING: &str =
    "Keep this file safe. Anyone with this file and your passphrase can access your data.";

/// The exported recovery document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryBundle {
    pub app: String,
    pub version: u32,
    pub created: DateTime<Utc>,
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Base64 key-derivation salt.
    pub salt: String,
    /// Verification token blob (base64).
    #[serde(rename = "encryptionCheck")]
    pub encryption_check: String,
    pub warning: String,
}

impl RecoveryBundle {
    /// Assemble a bundle for the given account. Pure data assembly.
    pub fn build(user_id: &str, salt: &str, encryption_check: &str) -> Self {
        Self {
            app: APP_NAME.into(),
            version: BUNDLE_VERSION,
            created: Utc::now(),
            user_id: user_id.into(),
            salt: salt.into(),
            encryption_check: encryption_check.into(),
            warning: WARNING.into(),
        }
    }

    /// Serialize to the exported JSON document (pretty-printed).
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing recovery bundle")
    }

    /// Parse a previously exported bundle.
    ///
    /// Consumed by the account-recovery flow; tolerant of nothing: a
    /// bundle that does not parse is reported as a decoding error rather
    /// than guessed at.
    pub fn from_json(json: &str) -> CryptoResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CryptoError::Decoding(format!("recovery bundle is not valid: {e}")))
    }

    /// Write the bundle into `dir` under [`RECOVERY_FILE_NAME`].
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(RECOVERY_FILE_NAME);
        let json = self.to_json()?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing recovery file: {}", path.display()))?;
        Ok(path)
    }
}
