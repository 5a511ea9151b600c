//! The `RecordStore` trait and its filter type

use serde_json::Value;
use stride_core::{Collection, NewRecord, RecordPatch, StoredRecord};
use uuid::Uuid;

use crate::error::StoreResult;

/// Equality filter over plaintext metadata columns.
///
/// The store can only ever filter on metadata; the sealed payload is
/// opaque to it by construction.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub eq: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.eq.push((field.into(), value.into()));
        self
    }

    /// True iff every equality clause matches the record's metadata.
    pub fn matches(&self, record: &StoredRecord) -> bool {
        self.eq
            .iter()
            .all(|(field, value)| record.fields.get(field) == Some(value))
    }
}

/// CRUD over named collections of encrypted-payload rows.
#[allow(async_fn_in_trait)]
pub trait RecordStore: Send + Sync {
    /// Insert a row; the store assigns id and timestamps.
    async fn insert(&self, collection: Collection, record: NewRecord) -> StoreResult<StoredRecord>;

    /// Fetch one row by id.
    async fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<StoredRecord>>;

    /// Apply a patch to a row; bumps `updated_at`.
    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: RecordPatch,
    ) -> StoreResult<StoredRecord>;

    /// Delete a row by id.
    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()>;

    /// All of one user's rows in a collection matching the filter.
    async fn select(
        &self,
        collection: Collection,
        user_id: &str,
        filter: &Filter,
    ) -> StoreResult<Vec<StoredRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stride_core::FieldMap;

    fn record_with(field: &str, value: Value) -> StoredRecord {
        let mut fields = FieldMap::new();
        fields.insert(field.into(), value);
        StoredRecord {
            id: Uuid::new_v4(),
            user_id: "u".into(),
            fields,
            data_encrypted: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().matches(&record_with("x", Value::Null)));
    }

    #[test]
    fn test_eq_filter() {
        let record = record_with("active", Value::Bool(true));

        assert!(Filter::new().eq("active", true).matches(&record));
        assert!(!Filter::new().eq("active", false).matches(&record));
        assert!(!Filter::new().eq("missing", true).matches(&record));
    }
}
