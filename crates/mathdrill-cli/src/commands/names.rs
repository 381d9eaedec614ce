//! The `mathdrill names` command.

use std::path::PathBuf;

use anyhow::Result;

use mathdrill_core::traits::suggest_names;

pub async fn execute(filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;
    let names = store.list_participant_names().await?;

    let shown = suggest_names(&names, filter.as_deref().unwrap_or(""));
    if shown.is_empty() {
        println!("No participants found.");
    }
    for name in shown {
        println!("{name}");
    }
    Ok(())
}
