//! Command-line interface parsing for pokefacade
//!
//! Every option can also come from the environment, so the same binary can
//! be configured from a shell profile or a container definition.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use reqwest::Url;
use thiserror::Error;

use crate::data::species::DEFAULT_SPECIES_BASE_URL;
use crate::data::translation::DEFAULT_TRANSLATION_BASE_URL;
use crate::data::transport::check_base_url;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A species name was empty or only whitespace
    #[error("Species name must not be empty")]
    EmptyName,

    /// A base URL did not parse or cannot take path segments
    #[error("Invalid URL for {option}: '{value}'")]
    InvalidUrl { option: &'static str, value: String },

    /// The request timeout was zero
    #[error("Timeout must be at least one second")]
    ZeroTimeout,
}

/// Where cached upstream responses are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackend {
    /// In-process only, gone when the command exits
    Memory,
    /// JSON files in the user cache directory
    File,
    /// Shared Redis server
    Redis,
}

/// Pokémon species lookup with Shakespeare and Yoda translations
#[derive(Parser, Debug)]
#[command(name = "pokefacade")]
#[command(about = "Look up Pokémon species descriptions, optionally in fun translation")]
#[command(version)]
pub struct Cli {
    /// Species names to look up (case-insensitive)
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    /// Translate descriptions (Yoda for cave or legendary, else Shakespeare)
    #[arg(short, long)]
    pub translate: bool,

    /// Species API base URL
    #[arg(long, env = "SPECIES_BASE_URL", default_value = DEFAULT_SPECIES_BASE_URL)]
    pub species_base_url: String,

    /// Translation API base URL
    #[arg(long, env = "TRANSLATION_BASE_URL", default_value = DEFAULT_TRANSLATION_BASE_URL)]
    pub translation_base_url: String,

    /// Cache backend
    #[arg(long, env = "CACHE_BACKEND", value_enum, default_value_t = CacheBackend::File)]
    pub cache: CacheBackend,

    /// Redis URL, used with --cache redis
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

/// Validated configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub names: Vec<String>,
    pub translate: bool,
    pub species_base_url: Url,
    pub translation_base_url: Url,
    pub cache: CacheBackend,
    pub redis_url: String,
    pub timeout: Duration,
}

/// Parses a base URL that can have path segments appended
fn parse_base_url(option: &'static str, value: &str) -> Result<Url, CliError> {
    let invalid = || CliError::InvalidUrl {
        option,
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    check_base_url(url).map_err(|_| invalid())
}

impl AppConfig {
    /// Creates an AppConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(AppConfig)` with names trimmed and URLs parsed
    /// * `Err(CliError)` on an empty name, a bad URL or a zero timeout
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let names = cli
            .names
            .iter()
            .map(|name| {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    Err(CliError::EmptyName)
                } else {
                    Ok(trimmed.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        if cli.timeout_secs == 0 {
            return Err(CliError::ZeroTimeout);
        }

        Ok(AppConfig {
            names,
            translate: cli.translate,
            species_base_url: parse_base_url("--species-base-url", &cli.species_base_url)?,
            translation_base_url: parse_base_url(
                "--translation-base-url",
                &cli.translation_base_url,
            )?,
            cache: cli.cache,
            redis_url: cli.redis_url.clone(),
            timeout: Duration::from_secs(cli.timeout_secs),
        })
    }
}
