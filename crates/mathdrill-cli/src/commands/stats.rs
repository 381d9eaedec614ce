//! The `mathdrill stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mathdrill_core::model::Mode;
use mathdrill_core::results::format_seconds;
use mathdrill_core::statistics::{compute_summary, run_rows};

pub async fn execute(
    mode: Mode,
    name: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;
    let records = store.list_by_mode(mode).await?;

    let name = name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let summary = compute_summary(&records, name);
    let rows = run_rows(&records, name);

    if format == "json" {
        let out = serde_json::json!({
            "mode": mode,
            "name": name,
            "summary": summary,
            "runs": rows,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if format != "text" {
        anyhow::bail!("unknown format '{format}' (expected text or json)");
    }

    println!(
        "Dashboard: {} ({})",
        match mode {
            Mode::Random => "arithmetic",
            Mode::TTable => "multiplication table",
        },
        name.unwrap_or("everyone")
    );

    let mut table = Table::new();
    table.set_header(vec![
        "Attempts",
        "Tasks",
        "Correct",
        "Wrong",
        "Unsolved",
        "Total time",
        "Avg/attempt",
        "Avg/task",
    ]);
    table.add_row(vec![
        Cell::new(summary.attempts),
        Cell::new(summary.total_tasks),
        Cell::new(summary.correct),
        Cell::new(summary.incorrect),
        Cell::new(summary.unsolved),
        Cell::new(format_seconds(summary.total_seconds)),
        Cell::new(summary.avg_attempt_display()),
        Cell::new(summary.avg_task_display()),
    ]);
    println!("{table}");

    if rows.is_empty() {
        println!("No saved sessions.");
        return Ok(());
    }

    let mut runs = Table::new();
    runs.set_header(vec![
        "Run", "Name", "Date", "Correct", "Wrong", "Unsolved", "Time", "Done",
    ]);
    for row in &rows {
        runs.add_row(vec![
            Cell::new(&row.run_id),
            Cell::new(&row.name),
            Cell::new(&row.timestamp),
            Cell::new(format!("{}/{}", row.correct, row.tasks)),
            Cell::new(row.incorrect),
            Cell::new(row.unsolved),
            Cell::new(&row.elapsed),
            Cell::new(if row.finished { "yes" } else { "no" }),
        ]);
    }
    println!("{runs}");
    Ok(())
}
