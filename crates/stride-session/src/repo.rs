//! Typed record operations over the codec and store
//!
//! Thin glue: every function takes the session context explicitly and
//! pairs one store call with the matching codec step. Updates follow
//! read-merge-seal: the partial payload is merged over the decrypted
//! payload before re-sealing, and metadata fields are patched as plain
//! columns, never encrypted.

use serde_json::Value;
use stride_core::{FieldMap, RecordPatch};
use stride_records::{
    decode, decode_batch, encode, reseal_merged, Decoded, Goal, GoalArena, RecordDecodeError,
    RecordKind,
};
use stride_store::{Filter, RecordStore, StoreError};
use uuid::Uuid;

use crate::error::SessionError;
use crate::session::Session;

/// Insert a new record of kind `K`.
pub async fn insert<K: RecordKind, S: RecordStore>(
    store: &S,
    session: &Session,
    meta: &K::Meta,
    payload: &K::Payload,
) -> Result<Decoded<K>, SessionError> {
    let new = encode::<K>(session.account_id(), meta, payload, session.key())?;
    let row = store.insert(K::COLLECTION, new).await?;
    decode::<K>(&row, session.key()).map_err(|e| SessionError::Codec(e.source))
}

/// List records of kind `K`, decoding each independently.
///
/// One bad record yields one `Err` entry and a warning, never a failed
/// batch. Callers render the failures as per-item error states.
pub async fn list<K: RecordKind, S: RecordStore>(
    store: &S,
    session: &Session,
    filter: &Filter,
) -> Result<Vec<Result<Decoded<K>, RecordDecodeError>>, SessionError> {
    let rows = store
        .select(K::COLLECTION, session.account_id(), filter)
        .await?;
    let results = decode_batch::<K>(&rows, session.key());

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        tracing::warn!(
            collection = K::COLLECTION.as_str(),
            record = %err.id,
            "record failed to decode: {err}"
        );
    }

    Ok(results)
}

/// Update a record: patch metadata columns and/or merge a partial payload.
///
/// With a payload patch, the stored blob is opened under the session key,
/// shallow-merged, and re-sealed; untouched payload fields survive.
pub async fn update<K: RecordKind, S: RecordStore>(
    store: &S,
    session: &Session,
    id: Uuid,
    fields: FieldMap,
    payload_patch: Option<&Value>,
) -> Result<Decoded<K>, SessionError> {
    let data_encrypted = match payload_patch {
        Some(partial) => {
            let row = store
                .get(K::COLLECTION, id)
                .await?
                .ok_or_else(|| StoreError::NotFound {
                    collection: K::COLLECTION.to_string(),
                    id,
                })?;
            Some(reseal_merged(&row, partial, session.key())?)
        }
        None => None,
    };

    let patch = RecordPatch {
        fields,
        data_encrypted,
    };
    let row = store.update(K::COLLECTION, id, patch).await?;
    decode::<K>(&row, session.key()).map_err(|e| SessionError::Codec(e.source))
}

/// Delete a record of kind `K`. Needs no key: ciphertext is discarded,
/// not opened.
pub async fn delete<K: RecordKind, S: RecordStore>(
    store: &S,
    id: Uuid,
) -> Result<(), SessionError> {
    store.delete(K::COLLECTION, id).await?;
    Ok(())
}

/// Load every goal into an arena, reporting undecodable ones separately.
pub async fn load_goal_arena<S: RecordStore>(
    store: &S,
    session: &Session,
) -> Result<(GoalArena, Vec<RecordDecodeError>), SessionError> {
    let results = list::<Goal, S>(store, session, &Filter::new()).await?;

    let mut goals = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(goal) => goals.push(goal),
            Err(e) => failures.push(e),
        }
    }

    Ok((GoalArena::build(goals), failures))
}
