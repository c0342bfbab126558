//! examforge CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{ArgGroup, Parser, Subcommand};

use commands::GenerationArgs;

mod commands;

#[derive(Parser)]
#[command(
    name = "examforge",
    version,
    about = "Generate multiple-choice exams from documents and take them"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an exam from a text document
    Generate {
        /// Path to the plain-text source document
        #[arg(long)]
        input: PathBuf,

        /// Output directory
        #[arg(long, default_value = "./examforge-output")]
        output: PathBuf,

        /// Output format: json, markdown, html, all (comma-separated)
        #[arg(long, default_value = "json")]
        format: String,

        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// Take an exam interactively
    #[command(group(ArgGroup::new("source").required(true).args(["input", "exam"])))]
    #[command(group(
        ArgGroup::new("generation_opts")
            .multiple(true)
            .args(["model", "temperature", "chunk_size", "max_questions", "config"])
            .conflicts_with("exam")
    ))]
    Quiz {
        /// Generate a fresh exam from this text document
        #[arg(long)]
        input: Option<PathBuf>,

        /// Load a previously exported exam JSON file
        #[arg(long)]
        exam: Option<PathBuf>,

        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// List available models
    ListModels {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("examforge=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            input,
            output,
            format,
            generation,
        } => commands::generate::execute(input, output, format, generation).await,
        Commands::Quiz {
            input,
            exam,
            generation,
        } => commands::quiz::execute(input, exam, generation).await,
        Commands::ListModels { config } => commands::list_models::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
