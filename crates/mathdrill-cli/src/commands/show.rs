//! The `mathdrill show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mathdrill_core::model::Mode;
use mathdrill_core::results::{format_seconds, OutcomeMarker, SessionParams};
use mathdrill_core::statistics::find_run;

pub async fn execute(
    mode: Mode,
    run_id: String,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;
    let records = store.list_by_mode(mode).await?;

    let Some(record) = find_run(&records, &run_id) else {
        anyhow::bail!("no saved {mode} session with run id '{}'", run_id.trim());
    };
    let r = &record.result;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(record)?);
            return Ok(());
        }
        "text" => {}
        other => anyhow::bail!("unknown format '{other}' (expected text or json)"),
    }

    println!("Run {} ({mode})", r.run_id);
    println!("  Name:    {}", r.name);
    println!("  Date:    {}", r.timestamp.format("%Y-%m-%d %H:%M"));
    println!("  Correct: {}/{}", r.correct, r.tasks);
    println!("  Time:    {}", format_seconds(r.seconds));
    println!("  Setup:   {}", describe(&r.params));

    let mut table = Table::new();
    table.set_header(vec!["#", "Task", "Answer", "Result", "Solution"]);
    for (i, detail) in r.tasks_detail.iter().enumerate() {
        let mark = match detail.check {
            OutcomeMarker::Correct => "✓",
            OutcomeMarker::Incorrect => "✗",
            OutcomeMarker::NotEvaluated => "-",
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&detail.expr),
            Cell::new(&detail.user),
            Cell::new(mark),
            Cell::new(detail.correct),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn describe(params: &SessionParams) -> String {
    match params {
        SessionParams::Random {
            op_name,
            a_start,
            a_end,
            b_start,
            b_end,
            int_only,
        } => {
            let mut text = format!("{op_name}, a {a_start}..{a_end}, b {b_start}..{b_end}");
            if *int_only {
                text.push_str(", integer only");
            }
            text
        }
        SessionParams::TTable {
            bases,
            max_for,
            sequential,
        } => {
            let tables = bases
                .iter()
                .map(|b| match max_for.get(&b.to_string()) {
                    Some(max) => format!("{b} (1..{max})"),
                    None => b.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            let order = if *sequential { "sequential" } else { "random" };
            format!("tables {tables}, {order}")
        }
    }
}
