//! The `mathdrill generate` command.

use std::path::PathBuf;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use mathdrill_core::generator::TaskGenerator;
use mathdrill_core::model::Mode;

use super::DrillArgs;

pub fn execute(
    mode: Mode,
    drill: DrillArgs,
    seed: Option<u64>,
    answers: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let settings = super::load_settings(&config, mode, &drill)?;
    let setup = settings.session_setup(mode);

    let generator = TaskGenerator::default();
    let batch = match seed {
        Some(seed) => {
            generator.generate_with(&setup.constraints, &mut StdRng::seed_from_u64(seed))?
        }
        None => generator.generate(&setup.constraints)?,
    };

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&batch.tasks)?),
        "text" => {
            let width = batch.tasks.len().to_string().len();
            for (i, task) in batch.tasks.iter().enumerate() {
                if answers {
                    println!("{:>width$}. {} = {}", i + 1, task.expression, task.expected);
                } else {
                    println!("{:>width$}. {} = ____", i + 1, task.expression);
                }
            }
        }
        other => anyhow::bail!("unknown format '{other}' (expected text or json)"),
    }

    if batch.shortfall() > 0 {
        eprintln!(
            "Only {} of {} tasks could be generated without repeats.",
            batch.tasks.len(),
            batch.requested
        );
    }
    Ok(())
}
