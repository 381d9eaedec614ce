//! Subcommand implementations and the options they share.

pub mod delete_all;
pub mod generate;
pub mod init;
pub mod names;
pub mod practice;
pub mod serve;
pub mod show;
pub mod stats;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use mathdrill_core::model::{Mode, Operation};
use mathdrill_core::settings::Settings;
use mathdrill_core::traits::ResultStore;
use mathdrill_store::{create_store, load_config_from, DrillConfig};

/// Drill overrides shared by `practice` and `generate`.
///
/// Anything given here replaces the stored preference for that field.
#[derive(Args, Debug, Default, Clone)]
pub struct DrillArgs {
    /// Participant name
    #[arg(long)]
    pub name: Option<String>,

    /// Number of tasks (5-50; ignored for sequential tables)
    #[arg(long)]
    pub count: Option<usize>,

    /// Operation: add, subtract, multiply, divide
    #[arg(long)]
    pub op: Option<Operation>,

    /// Lower bound for the first operand
    #[arg(long, allow_hyphen_values = true)]
    pub a_start: Option<String>,

    /// Upper bound for the first operand
    #[arg(long, allow_hyphen_values = true)]
    pub a_end: Option<String>,

    /// Lower bound for the second operand
    #[arg(long, allow_hyphen_values = true)]
    pub b_start: Option<String>,

    /// Upper bound for the second operand
    #[arg(long, allow_hyphen_values = true)]
    pub b_end: Option<String>,

    /// Division only: integer quotients
    #[arg(long)]
    pub int_only: Option<bool>,

    /// Multiplication tables to practice (e.g. "3,7")
    #[arg(long, value_delimiter = ',')]
    pub bases: Vec<u32>,

    /// Per-table ceiling as BASE=MAX (repeatable)
    #[arg(long = "max-for", value_parser = parse_ceiling)]
    pub max_for: Vec<(String, u32)>,

    /// Walk every table in order instead of drawing at random
    #[arg(long)]
    pub sequential: Option<bool>,
}

impl DrillArgs {
    /// Fold the overrides into `settings` for `mode`.
    pub fn apply(&self, settings: &mut Settings, mode: Mode) {
        if let Some(name) = &self.name {
            settings.set_name_for(mode, name.trim());
        }
        match mode {
            Mode::Random => {
                let s = &mut settings.arithmetic;
                if let Some(count) = self.count {
                    s.task_count = count;
                }
                if let Some(op) = self.op {
                    s.operation = op;
                }
                for (slot, value) in [
                    (&mut s.a_start, &self.a_start),
                    (&mut s.a_end, &self.a_end),
                    (&mut s.b_start, &self.b_start),
                    (&mut s.b_end, &self.b_end),
                ] {
                    if let Some(v) = value {
                        *slot = v.clone();
                    }
                }
                if let Some(int_only) = self.int_only {
                    s.integer_only = int_only;
                }
            }
            Mode::TTable => {
                let s = &mut settings.table;
                if let Some(count) = self.count {
                    s.task_count = count;
                }
                if !self.bases.is_empty() {
                    s.bases = self.bases.clone();
                }
                for (base, ceiling) in &self.max_for {
                    s.max_for.insert(base.clone(), *ceiling);
                }
                if let Some(sequential) = self.sequential {
                    s.sequential = sequential;
                }
            }
        }
    }
}

fn parse_ceiling(raw: &str) -> Result<(String, u32), String> {
    let (base, max) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected BASE=MAX, got '{raw}'"))?;
    let base = base.trim();
    base.parse::<u32>()
        .map_err(|_| format!("invalid base '{base}'"))?;
    let max = max
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid ceiling '{max}'"))?;
    Ok((base.to_string(), max))
}

/// Load config from `--config` or the default locations.
pub fn load_config(path: Option<PathBuf>) -> Result<DrillConfig> {
    let config = load_config_from(path.as_deref())?;
    tracing::debug!(?config, "loaded config");
    Ok(config)
}

/// Open the configured result store.
pub fn open_store(config: &DrillConfig) -> Result<Arc<dyn ResultStore>> {
    create_store(&config.store, config.admin_secret.clone())
}

/// Load practice settings and apply command-line overrides.
pub fn load_settings(config: &DrillConfig, mode: Mode, drill: &DrillArgs) -> Result<Settings> {
    let mut settings = Settings::load(&config.settings_path)?;
    drill.apply(&mut settings, mode);
    Ok(settings)
}
