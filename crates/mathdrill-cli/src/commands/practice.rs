//! The `mathdrill practice` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use mathdrill_core::clock::Ticker;
use mathdrill_core::error::SessionError;
use mathdrill_core::model::{Mode, Outcome};
use mathdrill_core::results::format_seconds;
use mathdrill_core::session::{Phase, SaveReceipt, Session};
use mathdrill_core::traits::{suggest_names, ResultStore};

use super::DrillArgs;

type Input = Lines<BufReader<Stdin>>;

/// What the running loop decided.
enum Exit {
    Saved(SaveReceipt),
    Regenerate,
    Quit,
}

pub async fn execute(
    mode: Mode,
    drill: DrillArgs,
    no_countdown: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;
    let mut settings = super::load_settings(&config, mode, &drill)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if settings.name_for(mode).trim().is_empty() {
        let name = ask_name(store.as_ref(), &mut input).await?;
        settings.set_name_for(mode, name);
    }

    let mut session = Session::new(settings.session_setup(mode));
    loop {
        let batch = session.regenerate()?;
        if batch.shortfall() > 0 {
            println!(
                "Only {} of {} tasks could be generated without repeats.",
                batch.tasks.len(),
                batch.requested
            );
        }
        settings
            .save(&config.settings_path)
            .context("failed to store practice settings")?;

        if let Err(e) = session.start_countdown() {
            anyhow::bail!("cannot start: {e}");
        }
        countdown(&mut session, no_countdown).await;

        println!(
            "{} tasks. Type an answer and press Enter. `?` shows the solution, \
             `!` shows all and saves, `:save`, `:regen`, `:quit`.",
            session.tasks().len()
        );

        match run(&mut session, store.as_ref(), &mut input).await? {
            Exit::Saved(receipt) => {
                print_summary(&session);
                println!(
                    "Saved run {} for {}: {}/{} correct in {}.",
                    receipt.run_id,
                    receipt.name,
                    receipt.correct,
                    receipt.tasks,
                    receipt.elapsed_display()
                );
                settings.set_name_for(mode, receipt.name);
                settings
                    .save(&config.settings_path)
                    .context("failed to store practice settings")?;
                return Ok(());
            }
            Exit::Regenerate => continue,
            Exit::Quit => {
                println!("Session ended without saving.");
                return Ok(());
            }
        }
    }
}

async fn ask_name(store: &dyn ResultStore, input: &mut Input) -> Result<String> {
    let known = match store.list_participant_names().await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(error = %e, "could not load participant names");
            Vec::new()
        }
    };
    if !known.is_empty() {
        println!("Known names: {}", known.join(", "));
    }
    loop {
        prompt("Name: ")?;
        let Some(line) = input.next_line().await? else {
            anyhow::bail!("no participant name given");
        };
        let typed = line.trim();
        if typed.is_empty() {
            continue;
        }
        // An unambiguous prefix of a known name picks that name.
        if let [only] = suggest_names(&known, typed).as_slice() {
            if only.to_lowercase().starts_with(&typed.to_lowercase()) {
                return Ok((*only).to_string());
            }
        }
        return Ok(typed.to_string());
    }
}

async fn countdown(session: &mut Session, skip: bool) {
    if skip {
        while matches!(session.phase(), Phase::Countdown(_)) {
            session.tick();
        }
        return;
    }
    let mut ticker = Ticker::start();
    while let Phase::Countdown(n) = session.phase() {
        println!("{n}...");
        if !ticker.tick().await {
            break;
        }
        session.tick();
    }
    println!("Go!");
}

async fn run(session: &mut Session, store: &dyn ResultStore, input: &mut Input) -> Result<Exit> {
    let mut ticker = Ticker::start();
    let mut current = next_open(session, 0);
    show_prompt(session, current)?;

    loop {
        tokio::select! {
            alive = ticker.tick(), if session.phase().is_ticking() => {
                if alive {
                    session.tick();
                }
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    return finish_on_eof(session, store).await;
                };
                if let Some(exit) = handle_line(session, store, &mut current, &line).await? {
                    ticker.cancel();
                    return Ok(exit);
                }
                show_prompt(session, current)?;
            }
        }
    }
}

async fn handle_line(
    session: &mut Session,
    store: &dyn ResultStore,
    current: &mut Option<usize>,
    line: &str,
) -> Result<Option<Exit>> {
    match line.trim() {
        ":quit" => return Ok(Some(Exit::Quit)),
        ":regen" => return Ok(Some(Exit::Regenerate)),
        ":save" => return Ok(try_save(session, store).await.map(Exit::Saved)),
        "!" => {
            *current = None;
            match session.reveal_all_and_save(store).await {
                Ok(receipt) => return Ok(Some(Exit::Saved(receipt))),
                Err(e) => println!("{e}. Type :save to retry or :quit."),
            }
            return Ok(None);
        }
        "?" => {
            let Some(index) = *current else {
                return Ok(None);
            };
            session.select(index)?;
            match session.reveal_selected() {
                Ok(task) => println!("  {} = {}", task.expression, task.expected),
                Err(e) => println!("{e}"),
            }
            *current = next_open(session, index + 1);
        }
        _ => {
            let Some(index) = *current else {
                println!("No open task. Type :save, :regen or :quit.");
                return Ok(None);
            };
            match session.answer(index, line) {
                Ok(Outcome::Correct) => println!("  ✓"),
                Ok(Outcome::Incorrect) => println!("  ✗"),
                Ok(_) => return Ok(None),
                Err(e) => {
                    println!("{e}");
                    return Ok(None);
                }
            }
            *current = next_open(session, index + 1);
        }
    }

    if current.is_none() {
        return Ok(try_save(session, store).await.map(Exit::Saved));
    }
    Ok(None)
}

/// Next task at or after `from` (wrapping) that still needs an answer.
fn next_open(session: &Session, from: usize) -> Option<usize> {
    let tasks = session.tasks();
    let n = tasks.len();
    (0..n)
        .map(|offset| (from + offset) % n)
        .find(|&i| !tasks[i].is_settled())
}

async fn try_save(session: &mut Session, store: &dyn ResultStore) -> Option<SaveReceipt> {
    match session.save(store).await {
        Ok(receipt) => Some(receipt),
        Err(SessionError::Incomplete { unsettled }) => {
            println!("{unsettled} task(s) still open.");
            None
        }
        Err(e) => {
            println!("{e}. Type :save to retry or :quit.");
            None
        }
    }
}

async fn finish_on_eof(session: &mut Session, store: &dyn ResultStore) -> Result<Exit> {
    if session.can_save().is_ok() {
        let receipt = session.save(store).await?;
        return Ok(Exit::Saved(receipt));
    }
    Ok(Exit::Quit)
}

fn show_prompt(session: &Session, current: Option<usize>) -> Result<()> {
    let Some(index) = current else {
        return Ok(());
    };
    let task = &session.tasks()[index];
    prompt(&format!(
        "[{}/{} {}] {} = ",
        index + 1,
        session.tasks().len(),
        format_seconds(session.elapsed()),
        task.expression
    ))
}

fn prompt(text: &str) -> Result<()> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_summary(session: &Session) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Task", "Answer", "Result", "Solution"]);
    for (i, task) in session.tasks().iter().enumerate() {
        let mark = match task.outcome {
            Outcome::Correct => "✓",
            Outcome::Incorrect => "✗",
            Outcome::Unset | Outcome::Revealed => "-",
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&task.expression),
            Cell::new(if task.answer.trim().is_empty() {
                "-"
            } else {
                task.answer.trim()
            }),
            Cell::new(mark),
            Cell::new(task.expected),
        ]);
    }
    println!("{table}");
}
