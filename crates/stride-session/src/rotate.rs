//! Passphrase rotation
//!
//! Rotation is a full session teardown: fresh salt, fresh key, every
//! record of every collection re-sealed read-merge-seal, and only then
//! the settings row switched over. Work happens in phases so the window
//! where blobs and salt disagree is as small as the store allows:
//!
//!   1. open every payload under the old key and re-seal under the new
//!      key, entirely in memory; any undecodable record aborts here,
//!      before a single row changes
//!   2. write the re-sealed blobs
//!   3. replace salt + verification token on the settings row
//!
//! The old `Session` is consumed; its key is zeroized on drop.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use stride_core::{Collection, FieldMap, RecordPatch, StrideConfig};
use stride_crypto::{
    create_check, generate_salt, open_json, seal_json, validate_passphrase, RecoveryBundle,
    SessionKey,
};
use stride_store::{Filter, RecordStore};
use uuid::Uuid;

use crate::error::SessionError;
use crate::session::{derive, Session};
use crate::unlock::load_settings;

/// Collections whose rows carry user payloads (settings handled apart).
const PAYLOAD_COLLECTIONS: [Collection; 5] = [
    Collection::Categories,
    Collection::Habits,
    Collection::Completions,
    Collection::Goals,
    Collection::Reflections,
];

/// Rotate to a new passphrase, re-encrypting the account's records.
///
/// Returns the replacement session and a fresh recovery bundle (the old
/// bundle dies with the old salt).
pub async fn rotate_passphrase<S: RecordStore>(
    store: &S,
    config: &StrideConfig,
    session: Session,
    new_passphrase: &SecretString,
    confirm: &SecretString,
) -> Result<(Session, RecoveryBundle), SessionError> {
    let policy = validate_passphrase(new_passphrase.expose_secret());
    if !policy.is_valid() {
        return Err(SessionError::Policy {
            missing: policy.missing,
        });
    }
    if new_passphrase.expose_secret() != confirm.expose_secret() {
        return Err(SessionError::Mismatch);
    }

    let account_id = session.account_id().to_string();
    let (settings_row, _) = load_settings(store, &account_id).await?;

    let new_salt = generate_salt();
    let new_key = derive(new_passphrase, &new_salt, config.crypto.pbkdf2_iterations).await?;
    let new_check = create_check(&new_key)?;

    // Phase 1: re-seal everything in memory.
    let mut resealed: Vec<(Collection, Uuid, String)> = Vec::new();
    for collection in PAYLOAD_COLLECTIONS {
        let rows = store.select(collection, &account_id, &Filter::new()).await?;
        for row in rows {
            let blob = reseal(&row.data_encrypted, session.key(), &new_key)?;
            resealed.push((collection, row.id, blob));
        }
    }
    let settings_blob = reseal(&settings_row.data_encrypted, session.key(), &new_key)?;

    // Phase 2: write the re-sealed records.
    let record_count = resealed.len();
    for (collection, id, blob) in resealed {
        store
            .update(
                collection,
                id,
                RecordPatch {
                    fields: FieldMap::new(),
                    data_encrypted: Some(blob),
                },
            )
            .await?;
    }

    // Phase 3: switch the settings row over to the new salt and token.
    let mut fields = FieldMap::new();
    fields.insert("encryption_salt".into(), Value::String(new_salt.clone()));
    fields.insert("encryption_check".into(), Value::String(new_check.clone()));
    store
        .update(
            Collection::UserSettings,
            settings_row.id,
            RecordPatch {
                fields,
                data_encrypted: Some(settings_blob),
            },
        )
        .await?;

    tracing::info!(
        account = %account_id,
        records = record_count,
        "passphrase rotated"
    );

    let recovery = RecoveryBundle::build(&account_id, &new_salt, &new_check);
    Ok((Session::new(account_id, new_key), recovery))
}

fn reseal(blob: &str, old_key: &SessionKey, new_key: &SessionKey) -> Result<String, SessionError> {
    let payload: Value = open_json(blob, old_key)?;
    Ok(seal_json(&payload, new_key)?)
}
