//! The result store seam.
//!
//! Implemented by the backends in `mathdrill-store`; the session layer and
//! the HTTP service only ever see `dyn ResultStore`.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::Mode;
use crate::results::{SessionResult, StoredRecord};

/// Trait for backends that persist completed sessions.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Human-readable backend name (e.g. "sqlite").
    fn name(&self) -> &str;

    /// Persist a completed session.
    async fn save(&self, result: &SessionResult) -> Result<StoredRecord, StoreError>;

    /// All records for one mode, newest first.
    async fn list_by_mode(&self, mode: Mode) -> Result<Vec<StoredRecord>, StoreError>;

    /// Every participant name across both modes, sorted and de-duplicated.
    async fn list_participant_names(&self) -> Result<Vec<String>, StoreError> {
        let (random, ttable) = futures::try_join!(
            self.list_by_mode(Mode::Random),
            self.list_by_mode(Mode::TTable)
        )?;
        Ok(collect_names(random.iter().chain(ttable.iter())))
    }

    /// Remove every record for `mode`, returning how many were deleted.
    ///
    /// Backends do not check credentials; callers go through an admin guard.
    async fn delete_all(&self, mode: Mode) -> Result<usize, StoreError>;
}

/// Sorted unique non-blank participant names from `records`.
pub fn collect_names<'a>(records: impl Iterator<Item = &'a StoredRecord>) -> Vec<String> {
    records
        .map(|r| r.result.name.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Case-insensitive substring filter used for name suggestions.
pub fn suggest_names<'a>(names: &'a [String], input: &str) -> Vec<&'a str> {
    let needle = input.trim().to_lowercase();
    names
        .iter()
        .filter(|n| needle.is_empty() || n.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}
