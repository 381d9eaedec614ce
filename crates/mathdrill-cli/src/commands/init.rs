//! The `mathdrill init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("mathdrill.toml").exists() {
        println!("mathdrill.toml already exists, skipping.");
    } else {
        std::fs::write("mathdrill.toml", SAMPLE_CONFIG)?;
        println!("Created mathdrill.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set MATHDRILL_ADMIN_SECRET if you want bulk deletion");
    println!("  2. Run: mathdrill practice --mode random --name <you>");
    println!("  3. Run: mathdrill stats --mode random");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mathdrill configuration

# Shared secret for `delete-all` and POST /delete-all-results.
# Leave unset to disable bulk deletion.
admin_secret = "${MATHDRILL_ADMIN_SECRET}"

# Practice preferences are written here between sessions.
settings_path = "./mathdrill-settings.toml"

[store]
type = "sqlite"
path = "./mathdrill.sqlite"

# [store]
# type = "file"
# path = "./mathdrill-results"

# [store]
# type = "remote"
# base_url = "http://127.0.0.1:8787"

[server]
host = "127.0.0.1"
port = 8787
"#;
