//! Account recovery from an exported bundle
//!
//! The import half of the recovery story: a user with their bundle file
//! and their passphrase can re-establish the account's key material after
//! local state is lost. The bundle proves nothing by itself; the typed
//! passphrase must still derive a key that opens the bundle's
//! verification token.

use secrecy::SecretString;
use serde_json::Value;
use stride_core::{Collection, FieldMap, RecordPatch, StrideConfig};
use stride_crypto::{verify, RecoveryBundle};
use stride_records::{encode, SettingsData, SettingsMeta, UserSettings};
use stride_store::{Filter, RecordStore};

use crate::error::SessionError;
use crate::session::{derive, Session};

/// Re-establish account settings from a recovery bundle.
///
/// Verifies the passphrase against the bundle first; only then are the
/// bundle's salt and verification token written back to the settings row
/// (restoring it if the row is gone entirely). Returns an unlocked
/// session on success, `WrongPassphrase` if the passphrase does not match
/// the bundle.
pub async fn recover<S: RecordStore>(
    store: &S,
    config: &StrideConfig,
    bundle: &RecoveryBundle,
    passphrase: &SecretString,
) -> Result<Session, SessionError> {
    let key = derive(passphrase, &bundle.salt, config.crypto.pbkdf2_iterations).await?;

    if !verify(&key, &bundle.encryption_check) {
        tracing::warn!(
            account = %bundle.user_id,
            "recovery failed: passphrase does not match bundle"
        );
        return Err(SessionError::WrongPassphrase);
    }

    let mut rows = store
        .select(Collection::UserSettings, &bundle.user_id, &Filter::new())
        .await?;

    match rows.pop() {
        Some(row) => {
            let mut fields = FieldMap::new();
            fields.insert("encryption_salt".into(), Value::String(bundle.salt.clone()));
            fields.insert(
                "encryption_check".into(),
                Value::String(bundle.encryption_check.clone()),
            );
            store
                .update(
                    Collection::UserSettings,
                    row.id,
                    RecordPatch {
                        fields,
                        data_encrypted: None,
                    },
                )
                .await?;
        }
        None => {
            let meta = SettingsMeta {
                encryption_salt: bundle.salt.clone(),
                encryption_check: bundle.encryption_check.clone(),
            };
            let row = encode::<UserSettings>(
                &bundle.user_id,
                &meta,
                &SettingsData::default(),
                &key,
            )?;
            store.insert(Collection::UserSettings, row).await?;
        }
    }

    tracing::info!(account = %bundle.user_id, "account recovered from bundle");
    Ok(Session::new(bundle.user_id.clone(), key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup;
    use crate::unlock::unlock;
    use stride_store::MemoryStore;

    fn test_config() -> StrideConfig {
        let mut config = StrideConfig::default();
        config.crypto.pbkdf2_iterations = 1_000;
        config
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn test_recover_restores_lost_settings_row() {
        let store = MemoryStore::new();
        let config = test_config();
        let pass = secret("CorrectHorse12!");

        let outcome = setup(&store, &config, "u1", &pass, &pass).await.unwrap();
        let bundle = outcome.recovery.clone();
        drop(outcome);

        // Simulate total loss of the settings row.
        let rows = store
            .select(Collection::UserSettings, "u1", &Filter::new())
            .await
            .unwrap();
        store
            .delete(Collection::UserSettings, rows[0].id)
            .await
            .unwrap();
        assert!(matches!(
            unlock(&store, &config, "u1", &pass).await,
            Err(SessionError::SetupRequired)
        ));

        let session = recover(&store, &config, &bundle, &pass).await.unwrap();
        assert_eq!(session.account_id(), "u1");

        // Normal unlock works again.
        assert!(unlock(&store, &config, "u1", &pass).await.is_ok());
    }

    #[tokio::test]
    async fn test_recover_rejects_wrong_passphrase() {
        let store = MemoryStore::new();
        let config = test_config();
        let pass = secret("CorrectHorse12!");

        let outcome = setup(&store, &config, "u1", &pass, &pass).await.unwrap();
        let result = recover(
            &store,
            &config,
            &outcome.recovery,
            &secret("WrongHorse12!"),
        )
        .await;

        assert!(matches!(result, Err(SessionError::WrongPassphrase)));
    }

    #[tokio::test]
    async fn test_recover_roundtrips_through_exported_json() {
        let store = MemoryStore::new();
        let config = test_config();
        let pass = secret("CorrectHorse12!");

        let outcome = setup(&store, &config, "u1", &pass, &pass).await.unwrap();
        let json = outcome.recovery.to_json().unwrap();
        let bundle = RecoveryBundle::from_json(&json).unwrap();

        assert!(recover(&store, &config, &bundle, &pass).await.is_ok());
    }
}
