use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use itertools::Itertools;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::answerer::{Answer, Responses};
use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::index::SearchResult;
use crate::indexer::IndexingStats;
use crate::llm::ChatClient;
use crate::session::{IndexOutcome, Session, SessionSettings};

/// A session talking to the configured Ollama and chat completion services
pub type ServiceSession = Session<OllamaClient, ChatClient>;

const HELP: &str = "\
Type a question to get two answers: one grounded in your PDFs and one without.
  :index     build the document index (once per session)
  :reindex   rebuild the index from the PDFs on disk
  :sources   show the document chunks behind the last grounded answer
  :help      show this message
  :quit      leave the session";

/// One line of input in the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Ask(String),
    Index,
    Reindex,
    Sources,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl SessionCommand {
    #[inline]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Empty,
            ":index" => Self::Index,
            ":reindex" => Self::Reindex,
            ":sources" => Self::Sources,
            ":help" | ":h" | ":?" => Self::Help,
            ":quit" | ":q" | ":exit" => Self::Quit,
            other if other.starts_with(':') => Self::Unknown(other.to_string()),
            question => Self::Ask(question.to_string()),
        }
    }
}

/// Load configuration with credentials from the environment and wire up the services
#[inline]
pub fn build_session(data_dir: Option<PathBuf>) -> Result<ServiceSession> {
    let config = Config::load_default().context("Failed to load configuration")?;
    session_from_config(&config, data_dir)
}

#[inline]
pub fn session_from_config(config: &Config, data_dir: Option<PathBuf>) -> Result<ServiceSession> {
    let embedder =
        OllamaClient::new(config).context("Failed to create embedding service client")?;
    let llm = ChatClient::new(config).context("Failed to create chat completion client")?;
    info!(
        "Embedding with {} via Ollama, answering with {}",
        embedder.model(),
        llm.model()
    );

    let mut settings = SessionSettings::from_config(config);
    if let Some(dir) = data_dir {
        settings.source_dir = dir;
    }
    debug!("Session settings: {:?}", settings);

    Ok(Session::new(embedder, llm, settings))
}

/// Interactive question loop on the terminal
#[inline]
pub fn run_session(data_dir: Option<PathBuf>, show_sources: bool) -> Result<()> {
    let mut session = build_session(data_dir)?;

    println!("{}", style("📄 Docs QA").bold().cyan());
    println!(
        "Documents: {}",
        style(session.settings().source_dir.display()).cyan()
    );
    println!("{}", HELP);
    println!();

    let mut last_sources: Vec<SearchResult> = Vec::new();

    loop {
        let line: String = Input::new()
            .with_prompt("Question")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        match SessionCommand::parse(&line) {
            SessionCommand::Empty => {}
            SessionCommand::Help => println!("{}", HELP),
            SessionCommand::Quit => break,
            SessionCommand::Unknown(command) => {
                println!(
                    "{}",
                    style(format!("Unknown command {}. Type :help for help.", command)).yellow()
                );
            }
            SessionCommand::Index => {
                println!("{}", render_index_result(&session.initialize_index()));
            }
            SessionCommand::Reindex => {
                last_sources.clear();
                let result = session.rebuild_index().map(IndexOutcome::Built);
                println!("{}", render_index_result(&result));
            }
            SessionCommand::Sources => {
                if last_sources.is_empty() {
                    println!("No sources yet. Ask a question first.");
                } else {
                    println!("{}", render_sources(&last_sources));
                }
            }
            SessionCommand::Ask(question) => match session.ask(&question) {
                Some(responses) => {
                    println!("{}", render_responses(&responses, show_sources));
                    last_sources = responses
                        .with_context
                        .map(|answer| answer.context)
                        .unwrap_or_default();
                }
                None => println!(
                    "{}",
                    style("Build the document index first with :index").yellow()
                ),
            },
        }
    }

    session.clear_index();
    info!("Session ended");
    Ok(())
}

/// Build the index, answer one question and exit
#[inline]
pub fn ask_once(question: &str, data_dir: Option<PathBuf>, show_sources: bool) -> Result<()> {
    let mut session = build_session(data_dir)?;

    let result = session.initialize_index();
    eprintln!("{}", render_index_result(&result));
    result?;

    let responses = session
        .ask(question)
        .context("Question must not be empty")?;
    println!("{}", render_responses(&responses, show_sources));
    Ok(())
}

#[inline]
pub fn render_index_result(result: &Result<IndexOutcome>) -> String {
    match result {
        Ok(IndexOutcome::Built(stats)) => render_stats(stats),
        Ok(IndexOutcome::AlreadyInitialized) => {
            style("Document index is already initialized.").green().to_string()
        }
        Err(e) => style(format!("Failed to initialize document index: {:#}", e))
            .red()
            .to_string(),
    }
}

fn render_stats(stats: &IndexingStats) -> String {
    format!(
        "{}\n  Pages loaded: {}\n  Pages indexed: {}\n  Chunks: {}",
        style("✓ Document index is ready").green(),
        stats.documents_loaded,
        stats.documents_used,
        stats.chunks_created
    )
}

/// Both answers with their headings. Failed answers show the error and the placeholder.
#[inline]
pub fn render_responses(responses: &Responses, show_sources: bool) -> String {
    format!(
        "{}\n\n{}",
        render_section(
            "Response with Context:",
            "Error during context-based response",
            &responses.with_context,
            show_sources,
        ),
        render_section(
            "Response without Context:",
            "Error during general response",
            &responses.without_context,
            false,
        )
    )
}

fn render_section(
    heading: &str,
    error_label: &str,
    result: &crate::Result<Answer>,
    show_sources: bool,
) -> String {
    let mut lines = vec![style(heading).bold().to_string()];
    match result {
        Ok(answer) => {
            lines.push(render_answer(answer));
            if show_sources && !answer.context.is_empty() {
                lines.push(String::new());
                lines.push(render_sources(&answer.context));
            }
        }
        Err(e) => {
            lines.push(style(format!("{}: {}", error_label, e)).red().to_string());
            lines.push(render_answer(&Answer::placeholder()));
        }
    }
    lines.join("\n")
}

fn render_answer(answer: &Answer) -> String {
    match answer.elapsed {
        Some(elapsed) => format!(
            "{}\n{}",
            answer.text,
            style(format!("Response time: {:.2} s", elapsed.as_secs_f64())).dim()
        ),
        None => answer.text.clone(),
    }
}

/// The retrieved chunks, separated by rules
#[inline]
pub fn render_sources(sources: &[SearchResult]) -> String {
    let rule = "-".repeat(40);
    let body = sources
        .iter()
        .map(|result| {
            format!(
                "{} (score {:.3})\n{}",
                style(result.chunk.metadata.describe()).cyan(),
                result.similarity_score,
                result.chunk.content
            )
        })
        .join(&format!("\n{}\n", rule));

    format!("{}\n{}", style("Document Similarity Search:").bold(), body)
}
