//! The `mathdrill serve` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use mathdrill_server::{bind_and_serve, AppState};
use mathdrill_store::StoreConfig;

pub async fn execute(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    if let StoreConfig::Remote { base_url } = &config.store {
        anyhow::bail!("refusing to serve on top of another remote store ({base_url})");
    }
    let store = super::open_store(&config)?;
    let state = Arc::new(AppState::new(store, config.admin_guard()));

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    bind_and_serve(&host, port, state).await
}
