//! The `mathdrill delete-all` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use mathdrill_core::model::Mode;
use mathdrill_store::{create_store, DeleteRequest, StoreConfig};

pub async fn execute(
    mode: Mode,
    password: String,
    yes: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config_path)?;

    if !yes && !confirm(mode)? {
        println!("Aborted.");
        return Ok(());
    }

    let deleted = match &config.store {
        // The service checks the password itself.
        StoreConfig::Remote { .. } => {
            let store = create_store(&config.store, Some(password))?;
            store.delete_all(mode).await?
        }
        _ => {
            let store = super::open_store(&config)?;
            let request = DeleteRequest {
                password,
                mode: mode.to_string(),
            };
            config
                .admin_guard()
                .delete_all(store.as_ref(), &request)
                .await?
                .deleted
        }
    };

    println!("Deleted {deleted} saved {mode} session(s).");
    Ok(())
}

fn confirm(mode: Mode) -> Result<bool> {
    print!("Delete every saved {mode} session? Type 'yes' to confirm: ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
