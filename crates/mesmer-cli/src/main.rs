//! mesmer CLI — Tigrinya quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod terminal;

use commands::sound::SoundAction;
use commands::Session;

#[derive(Parser)]
#[command(name = "mesmer", version, about = "Tigrinya language quizzes in the terminal")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for saved progress (overrides config and MESMER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz
    Play {
        /// Path to a quiz .toml file
        #[arg(long)]
        quiz: PathBuf,

        /// Seed for shuffling tiles and cards
        #[arg(long)]
        seed: Option<u64>,

        /// Skip animation delays
        #[arg(long)]
        fast: bool,
    },

    /// Show saved progress
    Progress {
        /// Show statistics for one quiz ID
        #[arg(long)]
        quiz: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Write saved progress as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace saved progress with an exported JSON file
    Import {
        /// Exported progress file
        file: PathBuf,
    },

    /// Delete saved progress
    Reset,

    /// Turn sound effects on or off
    Sound {
        #[arg(value_enum)]
        action: SoundAction,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// List available quizzes
    List {
        /// Quiz directory (default: quiz_dir from config)
        #[arg(long)]
        quiz_dir: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let open = || Session::open(cli.config.as_deref(), cli.data_dir.clone());

    match cli.command {
        Commands::Play { quiz, seed, fast } => {
            commands::play::execute(&open()?, quiz, seed, fast).await
        }
        Commands::Progress { quiz, format } => commands::progress::execute(&open()?, quiz, format),
        Commands::Export { output } => commands::export::execute(&open()?, output),
        Commands::Import { file } => commands::import::execute(&open()?, file),
        Commands::Reset => commands::reset::execute(&open()?),
        Commands::Sound { action } => commands::sound::execute(&open()?, action),
        Commands::List { quiz_dir } => commands::list::execute(&open()?, quiz_dir),
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Init => commands::init::execute(),
    }
}
