//! mathdrill-store: result store backends.
//!
//! Implements the `ResultStore` trait for in-memory, JSON file, SQLite and
//! remote HTTP storage, plus the admin guard for bulk deletion.

pub mod admin;
pub mod config;
pub mod file;
pub mod memory;
pub mod remote;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod testing;

pub use admin::{AdminGuard, DeleteRequest, DeleteResponse, ErrorBody};
pub use config::{create_store, load_config, load_config_from, DrillConfig, StoreConfig};
pub use mathdrill_core::error::StoreError;
