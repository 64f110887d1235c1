//! CLI argument definitions for the Friday assistant.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;

use friday_core::config::GeneralConfig;

/// Friday - a voice assistant core that reads transcripts and answers in JSON.
#[derive(Parser, Debug)]
#[command(name = "friday", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Data directory for the learning store.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Process a single utterance and exit instead of reading stdin.
    #[arg(long = "once", value_name = "TEXT")]
    pub once: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > FRIDAY_CONFIG env var > ~/.friday/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(|key| std::env::var(key).ok())
    }

    fn resolve_config_path_with<F>(&self, lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = lookup("FRIDAY_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }
}

/// `config.toml` inside the default data directory (`~/.friday`).
fn default_config_path() -> PathBuf {
    GeneralConfig::default()
        .resolved_data_dir()
        .join("config.toml")
}
