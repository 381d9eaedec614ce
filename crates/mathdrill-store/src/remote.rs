//! HTTP client for a remote mathdrill result service.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::instrument;

use mathdrill_core::error::StoreError;
use mathdrill_core::model::Mode;
use mathdrill_core::results::{SessionResult, StoredRecord};
use mathdrill_core::traits::ResultStore;

use crate::admin::{DeleteRequest, DeleteResponse, ErrorBody};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A store that talks to `mathdrill serve` (or a compatible service).
pub struct RemoteStore {
    base_url: String,
    admin_secret: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("base_url", &self.base_url)
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

impl RemoteStore {
    pub fn new(base_url: &str, admin_secret: Option<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Backend(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_secret,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(match status {
                401 => StoreError::Unauthorized,
                400 => StoreError::InvalidMode(message),
                _ => StoreError::Service { status, message },
            });
        }
        response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(format!("failed to parse response: {e}")))
    }
}

fn network(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Backend(format!("request timed out after {DEFAULT_TIMEOUT_SECS}s"))
    } else {
        StoreError::Backend(e.to_string())
    }
}

#[async_trait]
impl ResultStore for RemoteStore {
    fn name(&self) -> &str {
        "remote"
    }

    #[instrument(skip(self, result), fields(mode = %result.mode()))]
    async fn save(&self, result: &SessionResult) -> Result<StoredRecord, StoreError> {
        let response = self
            .client
            .post(self.url(&format!("/results/{}", result.mode())))
            .json(result)
            .send()
            .await
            .map_err(network)?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn list_by_mode(&self, mode: Mode) -> Result<Vec<StoredRecord>, StoreError> {
        let response = self
            .client
            .get(self.url(&format!("/results/{mode}")))
            .send()
            .await
            .map_err(network)?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn list_participant_names(&self) -> Result<Vec<String>, StoreError> {
        let response = self
            .client
            .get(self.url("/names"))
            .send()
            .await
            .map_err(network)?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn delete_all(&self, mode: Mode) -> Result<usize, StoreError> {
        let Some(password) = self.admin_secret.clone() else {
            return Err(StoreError::Unauthorized);
        };
        let body = DeleteRequest {
            password,
            mode: mode.to_string(),
        };
        let response = self
            .client
            .post(self.url("/delete-all-results"))
            .json(&body)
            .send()
            .await
            .map_err(network)?;
        let decoded: DeleteResponse = Self::decode(response).await?;
        Ok(decoded.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::random_result;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn save_posts_to_mode_route() {
        let server = MockServer::start().await;
        let result = random_result("Anna", "2025-01-01T00:00:00Z");
        let stored = StoredRecord::new(result.clone());

        Mock::given(method("POST"))
            .and(path("/results/random"))
            .respond_with(ResponseTemplate::new(201).set_body_json(&stored))
            .expect(1)
            .mount(&server)
            .await;

        let store = RemoteStore::new(&format!("{}/", server.uri()), None).unwrap();
        assert_eq!(store.save(&result).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn list_and_names() {
        let server = MockServer::start().await;
        let stored = StoredRecord::new(random_result("Anna", "2025-01-01T00:00:00Z"));

        Mock::given(method("GET"))
            .and(path("/results/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![&stored]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/names"))
            .respond_with(ResponseTemplate::new(200).set_body_json(["Anna", "Bence"]))
            .mount(&server)
            .await;

        let store = RemoteStore::new(&server.uri(), None).unwrap();
        assert_eq!(store.list_by_mode(Mode::Random).await.unwrap(), vec![stored]);
        assert_eq!(
            store.list_participant_names().await.unwrap(),
            vec!["Anna", "Bence"]
        );
    }

    #[tokio::test]
    async fn delete_sends_secret() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/delete-all-results"))
            .and(body_json(serde_json::json!({"password": "s3cret", "mode": "ttable"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "deleted": 4,
                "message": "done"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = RemoteStore::new(&server.uri(), Some("s3cret".into())).unwrap();
        assert_eq!(store.delete_all(Mode::TTable).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn delete_without_secret_never_calls_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = RemoteStore::new(&server.uri(), None).unwrap();
        let err = store.delete_all(Mode::Random).await.unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/delete-all-results"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "wrong admin password"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/results/ttable"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "db down"})),
            )
            .mount(&server)
            .await;

        let store = RemoteStore::new(&server.uri(), Some("wrong".into())).unwrap();
        assert!(matches!(
            store.delete_all(Mode::Random).await,
            Err(StoreError::Unauthorized)
        ));

        let err = store.list_by_mode(Mode::TTable).await.unwrap_err();
        match &err {
            StoreError::Service { status, message } => {
                assert_eq!(*status, 500);
                assert_eq!(message, "db down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unreachable_service_is_retryable() {
        let store = RemoteStore::new("http://127.0.0.1:1", None).unwrap();
        let err = store.list_participant_names().await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(err.is_retryable());
    }
}
