//! SQLite result store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::SecondsFormat;
use rusqlite::{params, Connection};
use tracing::instrument;

use mathdrill_core::error::StoreError;
use mathdrill_core::model::Mode;
use mathdrill_core::results::{SessionResult, StoredRecord};
use mathdrill_core::traits::ResultStore;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS results (
    id TEXT PRIMARY KEY,
    mode TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    payload TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_results_mode_created ON results(mode, created_at);
"#;

/// A store backed by a single SQLite database.
///
/// The connection is shared behind a mutex and every query runs on the
/// blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path).map_err(backend)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory().map_err(backend)?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(backend)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("sqlite task failed: {e}")))?
    }
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl ResultStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    #[instrument(skip(self, result), fields(mode = %result.mode()))]
    async fn save(&self, result: &SessionResult) -> Result<StoredRecord, StoreError> {
        let record = StoredRecord::new(result.clone());
        let payload = serde_json::to_string(&record.result)?;
        let id = record.id.to_string();
        let mode = result.mode().as_str();
        let name = result.name.clone();
        let created_at = result
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Micros, true);

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO results (id, mode, name, created_at, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, mode, name, created_at, payload],
            )
            .map_err(backend)?;
            Ok(())
        })
        .await?;
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list_by_mode(&self, mode: Mode) -> Result<Vec<StoredRecord>, StoreError> {
        let rows = self
            .with_conn(move |conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, payload FROM results WHERE mode = ?1
                         ORDER BY created_at DESC",
                    )
                    .map_err(backend)?;
                let rows = stmt
                    .query_map([mode.as_str()], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })
                    .map_err(backend)?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(backend)?;
                Ok(rows)
            })
            .await?;

        rows.into_iter()
            .map(|(id, payload)| {
                let id = id
                    .parse::<uuid::Uuid>()
                    .map_err(|e| StoreError::Serialization(format!("bad record id {id}: {e}")))?;
                let result: SessionResult = serde_json::from_str(&payload)?;
                Ok(StoredRecord { id, result })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn list_participant_names(&self) -> Result<Vec<String>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT DISTINCT trim(name) FROM results
                     WHERE trim(name) != '' ORDER BY trim(name)",
                )
                .map_err(backend)?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(backend)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(backend)?;
            Ok(names)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_all(&self, mode: Mode) -> Result<usize, StoreError> {
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM results WHERE mode = ?1", [mode.as_str()])
                .map_err(backend)
        })
        .await
    }
}
