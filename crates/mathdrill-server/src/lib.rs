//! mathdrill-server: HTTP result service.
//!
//! Serves saved sessions from any [`ResultStore`] and exposes the
//! admin-guarded bulk deletion endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mathdrill_core::error::StoreError;
use mathdrill_core::results::{SessionResult, StoredRecord};
use mathdrill_core::traits::ResultStore;
use mathdrill_store::admin::{parse_mode, AdminGuard, DeleteRequest, DeleteResponse, ErrorBody};

/// Shared handler state.
pub struct AppState {
    pub store: Arc<dyn ResultStore>,
    pub guard: AdminGuard,
}

impl AppState {
    pub fn new(store: Arc<dyn ResultStore>, guard: AdminGuard) -> Self {
        Self { store, guard }
    }
}

/// A store error rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::Unauthorized => StatusCode::UNAUTHORIZED,
            StoreError::InvalidMode(_) => StatusCode::BAD_REQUEST,
            StoreError::Service { .. } => StatusCode::BAD_GATEWAY,
            StoreError::Backend(_) | StoreError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/names", get(list_names))
        .route("/results/:mode", get(list_results).post(save_result))
        .route("/delete-all-results", post(delete_all_results))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until Ctrl+C.
pub async fn serve(listener: tokio::net::TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        store = state.store.name(),
        admin = state.guard.is_configured(),
        "result service listening"
    );
    if !state.guard.is_configured() {
        tracing::warn!("no admin secret configured; bulk deletion is disabled");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Bind `host:port` and serve.
pub async fn bind_and_serve(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /results/:mode
async fn save_result(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
    Json(result): Json<SessionResult>,
) -> Result<(StatusCode, Json<StoredRecord>), ApiError> {
    let mode = parse_mode(&mode)?;
    if result.mode() != mode {
        return Err(StoreError::InvalidMode(format!(
            "{} result posted to /results/{mode}",
            result.mode()
        ))
        .into());
    }
    let record = state.store.save(&result).await?;
    tracing::info!(%mode, run_id = %record.result.run_id, "stored result");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /results/:mode
async fn list_results(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<Vec<StoredRecord>>, ApiError> {
    let mode = parse_mode(&mode)?;
    Ok(Json(state.store.list_by_mode(mode).await?))
}

/// GET /names
async fn list_names(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.store.list_participant_names().await?))
}

/// POST /delete-all-results
///
/// The body is read loosely so a malformed mode is reported as 400 after the
/// password check instead of being rejected by the extractor.
async fn delete_all_results(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let request = DeleteRequest::from_json(&body);
    let response = state
        .guard
        .delete_all(state.store.as_ref(), &request)
        .await?;
    Ok(Json(response))
}
