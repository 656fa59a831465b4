// Configuration management module
// TOML settings on disk, credentials from the environment

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    ApiKey, Config, ConfigError, Credentials, EmbeddingConfig, IndexingConfig, LlmConfig,
};
