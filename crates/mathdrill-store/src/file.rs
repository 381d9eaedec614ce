//! JSON file result store.
//!
//! Keeps one JSON array per mode (`results_random.json`,
//! `results_ttable.json`) inside a directory. Writes go through a temp file
//! and a rename so a crash never leaves a half-written array behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

use mathdrill_core::error::StoreError;
use mathdrill_core::model::Mode;
use mathdrill_core::results::{sort_newest_first, SessionResult, StoredRecord};
use mathdrill_core::traits::ResultStore;

/// A store backed by JSON files in a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, mode: Mode) -> PathBuf {
        self.dir.join(format!("results_{}.json", mode.as_str()))
    }

    async fn read(&self, mode: Mode) -> Result<Vec<StoredRecord>, StoreError> {
        let path = self.path_for(mode);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::Backend(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn write(&self, mode: Mode, records: &[StoredRecord]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(mode);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl ResultStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    #[instrument(skip(self, result), fields(mode = %result.mode()))]
    async fn save(&self, result: &SessionResult) -> Result<StoredRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mode = result.mode();
        let mut records = self.read(mode).await?;
        let record = StoredRecord::new(result.clone());
        records.push(record.clone());
        self.write(mode, &records).await?;
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list_by_mode(&self, mode: Mode) -> Result<Vec<StoredRecord>, StoreError> {
        let mut records = self.read(mode).await?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self, mode: Mode) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let count = self.read(mode).await?.len();
        if count > 0 {
            self.write(mode, &[]).await?;
        }
        Ok(count)
    }
}
