use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{validate_key, RecordStore, StoreError};
use crate::record::{sort_newest_first, SubmissionRecord};

/// In-process store keyed by record id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, SubmissionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = SubmissionRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: Mutex::new(map),
        }
    }

    pub fn insert(&self, record: SubmissionRecord) {
        self.lock().insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, SubmissionRecord>> {
        // a poisoned map still holds consistent records
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        let mut records: Vec<SubmissionRecord> = self.lock().values().cloned().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn delete_one(&self, id: &str) -> Result<(), StoreError> {
        validate_key(id)?;
        match self.lock().remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { id: id.to_string() }),
        }
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_one_removes_only_that_id() {
        let store = MemoryStore::with_records([
            SubmissionRecord::new("a", "1", "", "", "", "2024-01-01T00:00:00Z"),
            SubmissionRecord::new("b", "2", "", "", "", "2024-01-02T00:00:00Z"),
        ]);
        store.delete_one("a").await.unwrap();
        let ids: Vec<_> = store
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn inserted_record_is_fetched_in_timestamp_order() {
        let store = MemoryStore::with_records([SubmissionRecord::new(
            "a",
            "1",
            "",
            "",
            "",
            "2024-01-01T00:00:00Z",
        )]);
        store.insert(SubmissionRecord::new("b", "2", "", "", "", "2024-02-01T00:00:00Z"));
        store.insert(SubmissionRecord::new("a", "3", "", "", "", "2023-01-01T00:00:00Z"));
        assert_eq!(store.len(), 2);
        let records = store.fetch_all().await.unwrap();
        assert_eq!(records[0].id, "b");
        assert_eq!(records[1].mobile, "3");
    }

    #[tokio::test]
    async fn delete_missing_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store.delete_one("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
