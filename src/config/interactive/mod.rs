#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use super::settings::{EMBEDDING_API_KEY_ENV, LLM_API_KEY_ENV};
use super::{Config, ConfigError, EmbeddingConfig, IndexingConfig, LlmConfig};
use crate::embeddings::OllamaClient;
use crate::embeddings::chunking::ChunkingConfig;

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Docs QA Configuration Setup").bold().cyan());
    eprintln!();

    let config_dir = Config::config_dir().context("Failed to resolve configuration directory")?;
    let mut config = load_existing_config(config_dir)?;

    eprintln!("{}", style("Embedding Service (Ollama)").bold().yellow());
    eprintln!("Configure the Ollama instance used to embed document chunks.");
    eprintln!();
    configure_embedding(&mut config.embedding)?;

    eprintln!();
    eprintln!("{}", style("Testing embedding service...").yellow());
    if test_ollama_connection(&config) {
        eprintln!("{}", style("✓ Ollama connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Ollama").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before indexing.");
    }

    eprintln!();
    eprintln!("{}", style("Completion Service").bold().yellow());
    eprintln!("Any OpenAI-compatible chat completion endpoint works here.");
    eprintln!();
    configure_llm(&mut config.llm)?;

    eprintln!();
    eprintln!("{}", style("Documents").bold().yellow());
    eprintln!();
    configure_indexing(&mut config.indexing, &mut config.chunking)?;

    eprintln!();
    eprintln!(
        "API keys are read from {} and {} at startup and are never saved.",
        style(EMBEDDING_API_KEY_ENV).cyan(),
        style(LLM_API_KEY_ENV).cyan()
    );

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();
    eprint!("{}", describe_config(&config));

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn describe_config(config: &Config) -> String {
    let mut out = String::new();
    let mut line = |label: &str, value: String| {
        out.push_str("  ");
        out.push_str(label);
        out.push_str(": ");
        out.push_str(&value);
        out.push('\n');
    };

    line("Embedding Model", config.embedding.model.clone());
    line(
        "Ollama URL",
        config
            .ollama_url()
            .map_or_else(|e| format!("Invalid ({})", e), |url| url.to_string()),
    );
    line("Embedding Batch Size", config.embedding.batch_size.to_string());
    line(
        "Embedding API Key",
        key_status(config.credentials.embedding_api_key.is_some()),
    );
    line("LLM Base URL", config.llm.base_url.clone());
    line("LLM Model", config.llm.model.clone());
    line("LLM Max Tokens", config.llm.max_tokens.to_string());
    line("LLM API Key", key_status(config.credentials.llm_api_key.is_some()));
    line(
        "Data Directory",
        config.indexing.data_dir.display().to_string(),
    );
    line(
        "Max Documents",
        match config.indexing.max_documents {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        },
    );
    line("Top K", config.indexing.top_k.to_string());
    line(
        "Chunking",
        format!(
            "{} chars, {} overlap",
            config.chunking.chunk_size, config.chunking.chunk_overlap
        ),
    );

    out
}

fn key_status(present: bool) -> String {
    if present { "set" } else { "not set" }.to_string()
}

fn load_existing_config(config_dir: PathBuf) -> Result<Config> {
    Config::load(&config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No usable configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: config_dir,
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_embedding(embedding: &mut EmbeddingConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == embedding.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;

    let protocol = protocols[protocol_index].to_string();

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(embedding.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = EmbeddingConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..EmbeddingConfig::default()
            };
            temp_config.validate()
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(embedding.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(embedding.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(embedding.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    embedding.set_protocol(protocol)?;
    embedding.set_host(host)?;
    embedding.set_port(port)?;
    embedding.set_model(model)?;
    embedding.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_llm(llm: &mut LlmConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("Chat completion base URL")
        .default(llm.base_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            LlmConfig {
                base_url: input.clone(),
                ..LlmConfig::default()
            }
            .chat_url()
            .map(|_| ())
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Chat model")
        .default(llm.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let max_tokens: u32 = Input::new()
        .with_prompt("Max tokens per answer")
        .default(llm.max_tokens)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if (1..=32_768).contains(input) {
                Ok(())
            } else {
                Err("Max tokens must be between 1 and 32768")
            }
        })
        .interact_text()?;

    llm.set_base_url(base_url)?;
    llm.set_model(model)?;
    llm.set_max_tokens(max_tokens)?;

    Ok(())
}

fn configure_indexing(indexing: &mut IndexingConfig, chunking: &mut ChunkingConfig) -> Result<()> {
    let data_dir: String = Input::new()
        .with_prompt("PDF directory")
        .default(indexing.data_dir.display().to_string())
        .interact_text()?;

    let max_documents: usize = Input::new()
        .with_prompt("Max pages to index (0 for no limit)")
        .default(indexing.max_documents)
        .interact_text()?;

    let top_k: usize = Input::new()
        .with_prompt("Chunks retrieved per question")
        .default(indexing.top_k)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err("Top k must be between 1 and 100")
            }
        })
        .interact_text()?;

    let chunk_size: usize = Input::new()
        .with_prompt("Chunk size (characters)")
        .default(chunking.chunk_size)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=100_000).contains(input) {
                Ok(())
            } else {
                Err("Chunk size must be between 1 and 100000")
            }
        })
        .interact_text()?;

    let chunk_overlap: usize = Input::new()
        .with_prompt("Chunk overlap (characters)")
        .default(chunking.chunk_overlap.min(chunk_size.saturating_sub(1)))
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input < chunk_size {
                Ok(())
            } else {
                Err("Overlap must be smaller than the chunk size")
            }
        })
        .interact_text()?;

    indexing.data_dir = PathBuf::from(data_dir);
    indexing.max_documents = max_documents;
    indexing.set_top_k(top_k)?;
    chunking.chunk_size = chunk_size;
    chunking.chunk_overlap = chunk_overlap;

    Ok(())
}

fn test_ollama_connection(config: &Config) -> bool {
    match OllamaClient::new(config) {
        Ok(client) => client
            .with_timeout(Duration::from_secs(5))
            .ping()
            .map_err(|e| debug!("Ollama connection test failed: {:#}", e))
            .is_ok(),
        Err(_) => false,
    }
}
