//! In-memory result store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use mathdrill_core::error::StoreError;
use mathdrill_core::model::Mode;
use mathdrill_core::results::{sort_newest_first, SessionResult, StoredRecord};
use mathdrill_core::traits::ResultStore;

/// A store that keeps records in process memory. Used for tests and for
/// running the service without persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Mode, Vec<StoredRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Mode, Vec<StoredRecord>>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save(&self, result: &SessionResult) -> Result<StoredRecord, StoreError> {
        let record = StoredRecord::new(result.clone());
        self.lock()?
            .entry(result.mode())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list_by_mode(&self, mode: Mode) -> Result<Vec<StoredRecord>, StoreError> {
        let mut records = self.lock()?.get(&mode).cloned().unwrap_or_default();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn delete_all(&self, mode: Mode) -> Result<usize, StoreError> {
        Ok(self.lock()?.remove(&mode).map_or(0, |v| v.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{random_result, table_result};

    #[tokio::test]
    async fn save_and_list_per_mode() {
        let store = MemoryStore::new();
        store
            .save(&random_result("Anna", "2025-01-01T00:00:00Z"))
            .await
            .unwrap();
        store
            .save(&random_result("Bence", "2025-02-01T00:00:00Z"))
            .await
            .unwrap();
        store
            .save(&table_result("Cili", "2025-03-01T00:00:00Z"))
            .await
            .unwrap();

        let random = store.list_by_mode(Mode::Random).await.unwrap();
        assert_eq!(random.len(), 2);
        assert_eq!(random[0].result.name, "Bence");
        assert_eq!(store.list_by_mode(Mode::TTable).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn names_span_both_modes() {
        let store = MemoryStore::new();
        store
            .save(&random_result("Bence", "2025-01-01T00:00:00Z"))
            .await
            .unwrap();
        store
            .save(&table_result("Anna", "2025-01-02T00:00:00Z"))
            .await
            .unwrap();
        store
            .save(&table_result("Bence", "2025-01-03T00:00:00Z"))
            .await
            .unwrap();
        store
            .save(&table_result("  ", "2025-01-04T00:00:00Z"))
            .await
            .unwrap();

        assert_eq!(
            store.list_participant_names().await.unwrap(),
            vec!["Anna".to_string(), "Bence".to_string()]
        );
    }

    #[tokio::test]
    async fn delete_all_only_touches_one_mode() {
        let store = MemoryStore::new();
        store
            .save(&random_result("Anna", "2025-01-01T00:00:00Z"))
            .await
            .unwrap();
        store
            .save(&table_result("Anna", "2025-01-01T00:00:00Z"))
            .await
            .unwrap();

        assert_eq!(store.delete_all(Mode::Random).await.unwrap(), 1);
        assert_eq!(store.delete_all(Mode::Random).await.unwrap(), 0);
        assert_eq!(store.list_by_mode(Mode::TTable).await.unwrap().len(), 1);
    }
}
