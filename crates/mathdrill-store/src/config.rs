//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mathdrill_core::traits::ResultStore;

use crate::admin::AdminGuard;
use crate::file::FileStore;
use crate::memory::MemoryStore;
use crate::remote::RemoteStore;
use crate::sqlite::SqliteStore;

/// Which backend holds saved sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    File {
        #[serde(default = "default_file_dir")]
        path: PathBuf,
    },
    Sqlite {
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
    Remote {
        base_url: String,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

fn default_file_dir() -> PathBuf {
    PathBuf::from("./mathdrill-results")
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./mathdrill.sqlite")
}

/// Result service bind address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

/// Top-level mathdrill configuration.
///
/// Note: custom Debug impl masks the admin secret.
#[derive(Clone, Serialize, Deserialize)]
pub struct DrillConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Shared secret for bulk deletion. Supports `${VAR}` references.
    #[serde(default)]
    pub admin_secret: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    /// Where practice preferences are kept.
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("./mathdrill-settings.toml")
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            admin_secret: None,
            server: ServerConfig::default(),
            settings_path: default_settings_path(),
        }
    }
}

impl std::fmt::Debug for DrillConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrillConfig")
            .field("store", &self.store)
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "***"))
            .field("server", &self.server)
            .field("settings_path", &self.settings_path)
            .finish()
    }
}

impl DrillConfig {
    pub fn admin_guard(&self) -> AdminGuard {
        AdminGuard::new(self.admin_secret.clone())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..start],
            value,
            &result[start + end + 1..]
        );
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mathdrill.toml` in the current directory
/// 2. `~/.config/mathdrill/config.toml`
///
/// Environment overrides: `MATHDRILL_ADMIN_SECRET`, `MATHDRILL_STORE_URL`.
pub fn load_config() -> Result<DrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DrillConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("mathdrill.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<DrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DrillConfig::default(),
    };

    if let Ok(secret) = std::env::var("MATHDRILL_ADMIN_SECRET") {
        config.admin_secret = Some(secret);
    }
    if let Ok(url) = std::env::var("MATHDRILL_STORE_URL") {
        config.store = StoreConfig::Remote { base_url: url };
    }

    config.admin_secret = config
        .admin_secret
        .as_deref()
        .map(resolve_env_vars)
        .filter(|s| !s.trim().is_empty());
    if let StoreConfig::Remote { base_url } = &mut config.store {
        *base_url = resolve_env_vars(base_url);
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mathdrill"))
}

/// Create a store instance from its configuration.
///
/// The admin secret is only needed by the remote backend, which forwards it
/// to the service on bulk deletion.
pub fn create_store(
    config: &StoreConfig,
    admin_secret: Option<String>,
) -> Result<Arc<dyn ResultStore>> {
    let store: Arc<dyn ResultStore> = match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::File { path } => Arc::new(FileStore::new(path.clone())),
        StoreConfig::Sqlite { path } => Arc::new(
            SqliteStore::open(path)
                .with_context(|| format!("failed to open database: {}", path.display()))?,
        ),
        StoreConfig::Remote { base_url } => Arc::new(RemoteStore::new(base_url, admin_secret)?),
    };
    tracing::debug!(store = store.name(), "created result store");
    Ok(store)
}
