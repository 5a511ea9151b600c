use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named collections in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    UserSettings,
    Categories,
    Habits,
    Completions,
    Goals,
    Reflections,
}

impl Collection {
    /// Collection name as it appears in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::UserSettings => "user_settings",
            Collection::Categories => "categories",
            Collection::Habits => "habits",
            Collection::Completions => "completions",
            Collection::Goals => "goals",
            Collection::Reflections => "reflections",
        }
    }

    /// All collections, in default-sync order.
    pub fn all() -> [Collection; 6] {
        [
            Collection::UserSettings,
            Collection::Categories,
            Collection::Habits,
            Collection::Completions,
            Collection::Goals,
            Collection::Reflections,
        ]
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plaintext metadata columns of a row, keyed by column name.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// A row as held by the record store.
///
/// `fields` flattens into the row itself, so the serialized form is
/// `{id, user_id, ...metadata, data_encrypted, created_at, updated_at}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub user_id: String,
    #[serde(flatten)]
    pub fields: FieldMap,
    /// Sealed payload blob (base64 of `nonce || ciphertext+tag`).
    pub data_encrypted: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row about to be inserted; the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub user_id: String,
    pub fields: FieldMap,
    pub data_encrypted: String,
}

/// A partial update to an existing row.
///
/// `fields` are merged over the row's metadata column by column;
/// `data_encrypted` replaces the blob wholesale (payload merging happens
/// client-side before re-sealing, never in the store).
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub fields: FieldMap,
    pub data_encrypted: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.data_encrypted.is_none()
    }
}
