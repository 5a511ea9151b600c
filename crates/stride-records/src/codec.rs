//! Encode/decode between domain records and store rows

use chrono::{DateTime, Utc};
use serde_json::Value;
use stride_core::{FieldMap, NewRecord, StoredRecord};
use stride_crypto::{open_json, seal_json, SessionKey};
use uuid::Uuid;

use crate::error::{CodecError, RecordDecodeError};
use crate::model::RecordKind;

/// A decoded record: row identity, typed metadata, opened payload.
#[derive(Debug, Clone)]
pub struct Decoded<K: RecordKind> {
    pub id: Uuid,
    pub user_id: String,
    pub meta: K::Meta,
    pub payload: K::Payload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn meta_to_fields<K: RecordKind>(meta: &K::Meta) -> Result<FieldMap, CodecError> {
    match serde_json::to_value(meta) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CodecError::Meta {
            collection: K::COLLECTION.as_str(),
            message: format!("metadata must serialize to an object, got {other}"),
        }),
        Err(e) => Err(CodecError::Meta {
            collection: K::COLLECTION.as_str(),
            message: e.to_string(),
        }),
    }
}

/// Encode a record for insertion: metadata becomes plaintext columns, the
/// payload is sealed under the session key.
pub fn encode<K: RecordKind>(
    user_id: &str,
    meta: &K::Meta,
    payload: &K::Payload,
    key: &SessionKey,
) -> Result<NewRecord, CodecError> {
    Ok(NewRecord {
        user_id: user_id.to_string(),
        fields: meta_to_fields::<K>(meta)?,
        data_encrypted: seal_json(payload, key)?,
    })
}

/// Decode one stored row back into a typed record.
pub fn decode<K: RecordKind>(
    row: &StoredRecord,
    key: &SessionKey,
) -> Result<Decoded<K>, RecordDecodeError> {
    let wrap = |source: CodecError| RecordDecodeError { id: row.id, source };

    let meta: K::Meta = serde_json::from_value(Value::Object(row.fields.clone()))
        .map_err(|e| {
            wrap(CodecError::Meta {
                collection: K::COLLECTION.as_str(),
                message: e.to_string(),
            })
        })?;

    let payload: K::Payload = open_json(&row.data_encrypted, key)
        .map_err(|e| wrap(CodecError::Crypto(e)))?;

    Ok(Decoded {
        id: row.id,
        user_id: row.user_id.clone(),
        meta,
        payload,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Decode a batch, isolating each record's outcome.
///
/// Records are independent: they share only the read-only key, so order
/// is irrelevant and one bad blob never blocks the rest.
pub fn decode_batch<K: RecordKind>(
    rows: &[StoredRecord],
    key: &SessionKey,
) -> Vec<Result<Decoded<K>, RecordDecodeError>> {
    rows.iter().map(|row| decode::<K>(row, key)).collect()
}

/// Shallow-merge a partial payload over an existing one.
///
/// Top-level keys in `partial` win; everything else survives untouched.
pub fn merge_payload(existing: &Value, partial: &Value) -> Value {
    match (existing, partial) {
        (Value::Object(base), Value::Object(updates)) => {
            let mut merged = base.clone();
            for (k, v) in updates {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        }
        _ => partial.clone(),
    }
}

/// Read-merge-seal: open a row's payload, apply a partial update, and
/// re-seal. Metadata never passes through here.
pub fn reseal_merged(
    row: &StoredRecord,
    partial: &Value,
    key: &SessionKey,
) -> Result<String, CodecError> {
    let existing: Value = open_json(&row.data_encrypted, key)?;
    let merged = merge_payload(&existing, partial);
    Ok(seal_json(&merged, key)?)
}
