//! tessbot CLI: discovers quiz answers through score feedback.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "tessbot",
    version,
    about = "Quiz answer discovery over the Tesseract API"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attempt every unbadged quiz of the given units and write a report
    Run {
        /// Unit ids to process, in order
        #[arg(num_args = 0.., conflicts_with = "subject")]
        units: Vec<u64>,

        /// Process every unit of this subject instead
        #[arg(long)]
        subject: Option<u64>,

        /// Access token (overrides TESSBOT_TOKEN and the config file)
        #[arg(long)]
        token: Option<String>,

        /// Max topics of a unit processed concurrently
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, all
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the topics of a unit
    Topics {
        /// Unit id
        unit: u64,

        #[arg(long)]
        token: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the units of a subject
    Units {
        /// Subject id
        subject: u64,

        #[arg(long)]
        token: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter tessbot.toml
    Init,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("tessbot_cli=info,tessbot_core=info,tessbot_client=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            units,
            subject,
            token,
            parallelism,
            output,
            format,
            config,
        } => {
            commands::run::execute(units, subject, token, parallelism, output, format, config)
                .await
        }
        Commands::Topics {
            unit,
            token,
            config,
        } => commands::topics::execute(unit, token, config).await,
        Commands::Units {
            subject,
            token,
            config,
        } => commands::units::execute(subject, token, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
