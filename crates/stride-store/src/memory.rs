//! In-memory record store for tests

use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use stride_core::{Collection, NewRecord, RecordPatch, StoredRecord};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{Filter, RecordStore};

/// A record store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<StoredRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total row count across all collections.
    pub fn len(&self) -> usize {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryStore {
    async fn insert(&self, collection: Collection, record: NewRecord) -> StoreResult<StoredRecord> {
        let now = Utc::now();
        let stored = StoredRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            fields: record.fields,
            data_encrypted: record.data_encrypted,
            created_at: now,
            updated_at: now,
        };

        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        collections
            .entry(collection)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<StoredRecord>> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(&collection)
            .and_then(|rows| rows.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: RecordPatch,
    ) -> StoreResult<StoredRecord> {
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let row = collections
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id,
            })?;

        for (field, value) in patch.fields {
            row.fields.insert(field, value);
        }
        if let Some(blob) = patch.data_encrypted {
            row.data_encrypted = blob;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let rows = collections
            .get_mut(&collection)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id,
            })?;

        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id,
            });
        }
        Ok(())
    }

    async fn select(
        &self,
        collection: Collection,
        user_id: &str,
        filter: &Filter,
    ) -> StoreResult<Vec<StoredRecord>> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.user_id == user_id && filter.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stride_core::FieldMap;

    fn new_record(user_id: &str, fields: FieldMap) -> NewRecord {
        NewRecord {
            user_id: user_id.into(),
            fields,
            data_encrypted: "blob".into(),
        }
    }

    fn fields(pairs: &[(&str, serde_json::Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let row = store
            .insert(Collection::Habits, new_record("u1", FieldMap::new()))
            .await
            .unwrap();

        assert_eq!(row.user_id, "u1");
        assert_eq!(row.created_at, row.updated_at);
        assert_eq!(store.get(Collection::Habits, row.id).await.unwrap().unwrap().id, row.id);
    }

    #[tokio::test]
    async fn test_select_filters_by_user_and_fields() {
        let store = MemoryStore::new();
        store
            .insert(
                Collection::Habits,
                new_record("u1", fields(&[("active", json!(true))])),
            )
            .await
            .unwrap();
        store
            .insert(
                Collection::Habits,
                new_record("u1", fields(&[("active", json!(false))])),
            )
            .await
            .unwrap();
        store
            .insert(
                Collection::Habits,
                new_record("u2", fields(&[("active", json!(true))])),
            )
            .await
            .unwrap();

        let active = store
            .select(Collection::Habits, "u1", &Filter::new().eq("active", true))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);

        let all = store
            .select(Collection::Habits, "u1", &Filter::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_bumps_updated_at() {
        let store = MemoryStore::new();
        let row = store
            .insert(
                Collection::Goals,
                new_record("u1", fields(&[("status", json!("active"))])),
            )
            .await
            .unwrap();

        let patch = RecordPatch {
            fields: fields(&[("status", json!("completed"))]),
            data_encrypted: Some("new-blob".into()),
        };
        let updated = store.update(Collection::Goals, row.id, patch).await.unwrap();

        assert_eq!(updated.fields["status"], json!("completed"));
        assert_eq!(updated.data_encrypted, "new-blob");
        assert!(updated.updated_at >= row.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let result = store
            .update(Collection::Goals, Uuid::new_v4(), RecordPatch::default())
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let store = MemoryStore::new();
        let row = store
            .insert(Collection::Reflections, new_record("u1", FieldMap::new()))
            .await
            .unwrap();

        store.delete(Collection::Reflections, row.id).await.unwrap();
        assert!(store
            .get(Collection::Reflections, row.id)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            store.delete(Collection::Reflections, row.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
