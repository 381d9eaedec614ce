//! Admin-guarded bulk deletion.
//!
//! The shared secret comes from configuration. With no secret configured,
//! every deletion is refused.

use serde::{Deserialize, Serialize};

use mathdrill_core::error::StoreError;
use mathdrill_core::model::Mode;
use mathdrill_core::traits::ResultStore;

/// Body of a bulk deletion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub mode: String,
}

impl DeleteRequest {
    /// Read a request from an arbitrary JSON body.
    ///
    /// A missing or non-string password reads as empty. A non-string mode is
    /// kept as its JSON text so it fails mode parsing after the password check.
    pub fn from_json(body: &serde_json::Value) -> Self {
        let password = body
            .get("password")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let mode = match body.get("mode") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        Self { password, mode }
    }
}

/// Body of a successful bulk deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: usize,
    pub message: String,
}

/// Error body shared by the result service endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Checks the admin secret before delegating a bulk deletion.
#[derive(Clone, Default)]
pub struct AdminGuard {
    secret: Option<String>,
}

impl std::fmt::Debug for AdminGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGuard")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .finish()
    }
}

impl AdminGuard {
    /// Build a guard; a blank secret counts as none.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Reject unless `password` matches the configured secret.
    pub fn verify(&self, password: &str) -> Result<(), StoreError> {
        match &self.secret {
            Some(secret) if constant_time_eq(secret.as_bytes(), password.as_bytes()) => Ok(()),
            _ => Err(StoreError::Unauthorized),
        }
    }

    /// Delete every record of `mode` after checking the password.
    ///
    /// The password is checked before the mode is parsed, so a caller with
    /// the wrong password learns nothing about valid modes.
    pub async fn delete_all(
        &self,
        store: &dyn ResultStore,
        request: &DeleteRequest,
    ) -> Result<DeleteResponse, StoreError> {
        if let Err(e) = self.verify(&request.password) {
            tracing::warn!(mode = %request.mode, "rejected bulk deletion: bad password");
            return Err(e);
        }
        let mode = parse_mode(&request.mode)?;
        let deleted = store.delete_all(mode).await?;
        tracing::info!(%mode, deleted, store = store.name(), "deleted all results");
        Ok(DeleteResponse {
            success: true,
            deleted,
            message: format!("All saved {mode} results have been deleted."),
        })
    }
}

/// Accept only the canonical mode names on the wire.
pub fn parse_mode(raw: &str) -> Result<Mode, StoreError> {
    Mode::ALL
        .into_iter()
        .find(|m| m.as_str() == raw)
        .ok_or_else(|| StoreError::InvalidMode(raw.to_string()))
}

/// Compare two byte strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::testing::{random_result, table_result};

    fn request(password: &str, mode: &str) -> DeleteRequest {
        DeleteRequest {
            password: password.into(),
            mode: mode.into(),
        }
    }

    #[test]
    fn request_from_loose_json() {
        let req = DeleteRequest::from_json(&serde_json::json!({"password": "s", "mode": 5}));
        assert_eq!(req.password, "s");
        assert_eq!(req.mode, "5");
        assert!(matches!(parse_mode(&req.mode), Err(StoreError::InvalidMode(_))));

        let req = DeleteRequest::from_json(&serde_json::json!({"password": 1, "mode": "ttable"}));
        assert_eq!(req.password, "");
        assert_eq!(req.mode, "ttable");

        let req = DeleteRequest::from_json(&serde_json::json!([]));
        assert_eq!((req.password.as_str(), req.mode.as_str()), ("", ""));
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret!"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn unconfigured_guard_rejects_everything() {
        let guard = AdminGuard::new(Some("   ".into()));
        assert!(!guard.is_configured());
        assert!(matches!(guard.verify(""), Err(StoreError::Unauthorized)));
        assert!(matches!(guard.verify("   "), Err(StoreError::Unauthorized)));
    }

    #[test]
    fn debug_masks_secret() {
        let guard = AdminGuard::new(Some("hunter2".into()));
        assert!(!format!("{guard:?}").contains("hunter2"));
    }

    #[test]
    fn wire_modes_are_exact() {
        assert_eq!(parse_mode("random").unwrap(), Mode::Random);
        assert_eq!(parse_mode("ttable").unwrap(), Mode::TTable);
        assert!(matches!(parse_mode("table"), Err(StoreError::InvalidMode(_))));
        assert!(matches!(parse_mode(""), Err(StoreError::InvalidMode(_))));
    }

    #[tokio::test]
    async fn wrong_password_checked_before_mode() {
        let store = MemoryStore::new();
        store
            .save(&random_result("Anna", "2025-01-01T00:00:00Z"))
            .await
            .unwrap();
        let guard = AdminGuard::new(Some("s3cret".into()));

        let err = guard
            .delete_all(&store, &request("nope", "bogus"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));

        let err = guard
            .delete_all(&store, &request("s3cret", "bogus"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidMode(_)));
        assert_eq!(store.list_by_mode(Mode::Random).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deletes_only_the_requested_mode() {
        let store = MemoryStore::new();
        store
            .save(&random_result("Anna", "2025-01-01T00:00:00Z"))
            .await
            .unwrap();
        store
            .save(&table_result("Anna", "2025-01-01T00:00:00Z"))
            .await
            .unwrap();
        let guard = AdminGuard::new(Some("s3cret".into()));

        let response = guard
            .delete_all(&store, &request("s3cret", "random"))
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.deleted, 1);
        assert_eq!(store.list_by_mode(Mode::TTable).await.unwrap().len(), 1);
    }
}
