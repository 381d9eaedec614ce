//! mathdrill CLI: terminal practice sessions and result management.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use mathdrill_core::model::Mode;

mod commands;

use commands::DrillArgs;

#[derive(Parser)]
#[command(name = "mathdrill", version, about = "Arithmetic and multiplication-table drills")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive practice session
    Practice {
        /// Practice mode: random or ttable
        #[arg(long, default_value = "random")]
        mode: Mode,

        #[command(flatten)]
        drill: DrillArgs,

        /// Skip the 3-2-1 countdown
        #[arg(long)]
        no_countdown: bool,
    },

    /// Print a batch of tasks without starting a session
    Generate {
        #[arg(long, default_value = "random")]
        mode: Mode,

        #[command(flatten)]
        drill: DrillArgs,

        /// Seed for reproducible batches
        #[arg(long)]
        seed: Option<u64>,

        /// Print expected values next to each task
        #[arg(long)]
        answers: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show dashboard statistics for saved sessions
    Stats {
        #[arg(long, default_value = "random")]
        mode: Mode,

        /// Only count sessions by this participant
        #[arg(long)]
        name: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show one saved session task by task
    Show {
        #[arg(long, default_value = "random")]
        mode: Mode,

        /// Run identifier printed when the session was saved
        run_id: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List participant names across both modes
    Names {
        /// Case-insensitive substring filter
        #[arg(long)]
        filter: Option<String>,
    },

    /// Delete every saved session of one mode (admin)
    DeleteAll {
        #[arg(long)]
        mode: Mode,

        /// Admin password
        #[arg(long)]
        password: String,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Run the HTTP result service
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mathdrill=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Practice {
            mode,
            drill,
            no_countdown,
        } => commands::practice::execute(mode, drill, no_countdown, config).await,
        Commands::Generate {
            mode,
            drill,
            seed,
            answers,
            format,
        } => commands::generate::execute(mode, drill, seed, answers, format, config),
        Commands::Stats { mode, name, format } => {
            commands::stats::execute(mode, name, format, config).await
        }
        Commands::Show {
            mode,
            run_id,
            format,
        } => commands::show::execute(mode, run_id, format, config).await,
        Commands::Names { filter } => commands::names::execute(filter, config).await,
        Commands::DeleteAll {
            mode,
            password,
            yes,
        } => commands::delete_all::execute(mode, password, yes, config).await,
        Commands::Serve { host, port } => commands::serve::execute(host, port, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
