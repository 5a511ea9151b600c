//! Session unlock

use secrecy::SecretString;
use serde_json::Value;
use stride_core::{Collection, StoredRecord, StrideConfig};
use stride_crypto::verify;
use stride_device::{DeviceCache, KeyValueStore};
use stride_records::{CodecError, SettingsMeta};
use stride_store::{Filter, RecordStore};

use crate::error::SessionError;
use crate::session::{derive, Session};

/// Load the account's settings row, or report that setup is needed.
pub(crate) async fn load_settings<S: RecordStore>(
    store: &S,
    account_id: &str,
) -> Result<(StoredRecord, SettingsMeta), SessionError> {
    let mut rows = store
        .select(Collection::UserSettings, account_id, &Filter::new())
        .await?;
    let row = rows.pop().ok_or(SessionError::SetupRequired)?;

    let meta: SettingsMeta = serde_json::from_value(Value::Object(row.fields.clone()))
        .map_err(|e| {
            SessionError::Codec(CodecError::Meta {
                collection: Collection::UserSettings.as_str(),
                message: e.to_string(),
            })
        })?;

    Ok((row, meta))
}

/// Unlock with a typed passphrase.
///
/// Derives a candidate key over the stored salt and lets the verification
/// token decide. A failed verification is `WrongPassphrase`: clear the
/// field and let the user retry; nothing locks and nothing is written.
pub async fn unlock<S: RecordStore>(
    store: &S,
    config: &StrideConfig,
    account_id: &str,
    passphrase: &SecretString,
) -> Result<Session, SessionError> {
    let (_, meta) = load_settings(store, account_id).await?;

    let key = derive(passphrase, &meta.encryption_salt, config.crypto.pbkdf2_iterations).await?;

    if verify(&key, &meta.encryption_check) {
        tracing::info!(account = account_id, "session unlocked");
        Ok(Session::new(account_id, key))
    } else {
        tracing::warn!(account = account_id, "unlock failed: incorrect passphrase");
        Err(SessionError::WrongPassphrase)
    }
}

/// Try to unlock from the device credential cache.
///
/// `Ok(None)` means no usable cached credential, so prompt the user. A
/// cached passphrase that no longer verifies (rotated elsewhere) is
/// treated as stale: the slot is cleared and the caller falls back to the
/// prompt instead of seeing an error.
pub async fn unlock_from_device<S: RecordStore, K: KeyValueStore>(
    store: &S,
    config: &StrideConfig,
    cache: &DeviceCache<K>,
    account_id: &str,
) -> Result<Option<Session>, SessionError> {
    let Some(passphrase) = cache.retrieve(account_id) else {
        return Ok(None);
    };

    match unlock(store, config, account_id, &passphrase).await {
        Ok(session) => Ok(Some(session)),
        Err(SessionError::WrongPassphrase) => {
            tracing::warn!(
                account = account_id,
                "cached device credential is stale; clearing"
            );
            cache.clear();
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
