use clap::{Parser, Subcommand};
use docs_qa::Result;
use docs_qa::commands::{ask_once, run_session};
use docs_qa::config::{run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docs-qa")]
#[command(about = "Ask questions about your PDFs, with and without document context")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive question session
    Session {
        /// Directory containing the PDF files, overriding the configured one
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Print the retrieved chunks under every grounded answer
        #[arg(long)]
        show_sources: bool,
    },
    /// Index the PDFs and answer a single question
    Ask {
        /// The question to answer
        question: String,
        /// Directory containing the PDF files, overriding the configured one
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Print the retrieved chunks under the grounded answer
        #[arg(long)]
        show_sources: bool,
    },
    /// Configure the embedding and completion services
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Session {
            data_dir,
            show_sources,
        } => {
            run_session(data_dir, show_sources)?;
        }
        Commands::Ask {
            question,
            data_dir,
            show_sources,
        } => {
            ask_once(&question, data_dir, show_sources)?;
        }
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
    }

    Ok(())
}
