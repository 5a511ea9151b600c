//! JSON-file record store
//!
//! Backs the CLI's local mode: one JSON document holding every collection,
//! rewritten atomically on mutation (temp file + rename) so a concurrent
//! reader never observes a partial store. Rows serialize exactly as the
//! wire shape: metadata columns flattened next to `data_encrypted`.

use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use stride_core::{Collection, NewRecord, RecordPatch, StoredRecord};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{Filter, RecordStore};

type Collections = HashMap<String, Vec<StoredRecord>>;

/// A record store persisted to a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> StoreResult<Collections> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Collections::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, collections: &Collections) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(collections)?;

        let parent = self.path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
        ));
        tokio::fs::write(&tmp_path, json.as_bytes()).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    async fn insert(&self, collection: Collection, record: NewRecord) -> StoreResult<StoredRecord> {
        let _guard = self.lock.lock().await;
        let mut collections = self.read_all().await?;

        let now = Utc::now();
        let stored = StoredRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            fields: record.fields,
            data_encrypted: record.data_encrypted,
            created_at: now,
            updated_at: now,
        };

        collections
            .entry(collection.as_str().to_string())
            .or_default()
            .push(stored.clone());
        self.write_all(&collections).await?;

        tracing::debug!(collection = %collection, id = %stored.id, "record inserted");
        Ok(stored)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<StoredRecord>> {
        let _guard = self.lock.lock().await;
        let collections = self.read_all().await?;
        Ok(collections
            .get(collection.as_str())
            .and_then(|rows| rows.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: RecordPatch,
    ) -> StoreResult<StoredRecord> {
        let _guard = self.lock.lock().await;
        let mut collections = self.read_all().await?;

        let row = collections
            .get_mut(collection.as_str())
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
        let updated = row.clone();

        self.write_all(&collections).await?;
        Ok(updated)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut collections = self.read_all().await?;

        let rows = collections
            .get_mut(collection.as_str())
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

        self.write_all(&collections).await?;
        Ok(())
    }

    async fn select(
        &self,
        collection: Collection,
        user_id: &str,
        filter: &Filter,
    ) -> StoreResult<Vec<StoredRecord>> {
        let _guard = self.lock.lock().await;
        let collections = self.read_all().await?;
        Ok(collections
            .get(collection.as_str())
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

    fn new_record(user_id: &str) -> NewRecord {
        let mut fields = FieldMap::new();
        fields.insert("order_num".into(), json!(1));
        NewRecord {
            user_id: user_id.into(),
            fields,
            data_encrypted: "blob".into(),
        }
    }

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");

        let id = {
            let store = JsonFileStore::new(&path);
            store
                .insert(Collection::Categories, new_record("u1"))
                .await
                .unwrap()
                .id
        };

        let store = JsonFileStore::new(&path);
        let row = store.get(Collection::Categories, id).await.unwrap().unwrap();
        assert_eq!(row.user_id, "u1");
        assert_eq!(row.fields["order_num"], json!(1));
    }

    #[tokio::test]
    async fn test_serialized_row_shape_is_flat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");

        let store = JsonFileStore::new(&path);
        store
            .insert(Collection::Categories, new_record("u1"))
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let row = &value["categories"][0];

        assert!(row["id"].is_string());
        assert_eq!(row["user_id"], json!("u1"));
        assert_eq!(row["order_num"], json!(1));
        assert_eq!(row["data_encrypted"], json!("blob"));
        assert!(row["created_at"].is_string());
        assert!(row.get("fields").is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("records.json"));

        let row = store
            .insert(Collection::Habits, new_record("u1"))
            .await
            .unwrap();

        let patch = RecordPatch {
            fields: FieldMap::new(),
            data_encrypted: Some("new-blob".into()),
        };
        let updated = store.update(Collection::Habits, row.id, patch).await.unwrap();
        assert_eq!(updated.data_encrypted, "new-blob");

        store.delete(Collection::Habits, row.id).await.unwrap();
        assert!(store.get(Collection::Habits, row.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("never-written.json"));

        let rows = store
            .select(Collection::Habits, "u1", &Filter::new())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
