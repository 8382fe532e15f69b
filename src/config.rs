//! Configuration management for the nano client
//!
//! Supports configuration via command line arguments, environment variables,
//! and an optional configuration file (YAML/JSON). Command line values take
//! precedence over the file, which takes precedence over built-in defaults.

use crate::{Difficulty, Error, Network, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use crate::worker::MAX_THREADS;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level: tracing::Level = (*self).into();
        write!(f, "{}", level.as_str().to_ascii_lowercase())
    }
}

/// Log output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Block kinds that select a network work threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BlockKind {
    /// Send and change blocks
    #[default]
    Send,
    /// Receive and open blocks
    Receive,
}

/// Command line interface
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nano-client",
    version = env!("CARGO_PKG_VERSION"),
    about = "Nano block-lattice client tools",
    long_about = "Derive keys and addresses, convert amounts and difficulties, and generate or check proof-of-work for Nano state blocks"
)]
pub struct Config {
    /// Configuration file path (YAML or JSON)
    #[arg(long, value_name = "FILE", env = "NANO_CLIENT_CONFIG", global = true)]
    pub config_file: Option<PathBuf>,

    /// Log level [default: info]
    #[arg(short = 'l', long, env = "NANO_CLIENT_LOG_LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "NANO_CLIENT_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Work search threads, 0 for one per core [default: 0]
    #[arg(short = 't', long, env = "NANO_CLIENT_THREADS", global = true)]
    pub threads: Option<usize>,

    /// Address prefix, overriding the configured network
    #[arg(long, env = "NANO_CLIENT_PREFIX", global = true)]
    pub prefix: Option<String>,

    #[command(subcommand)]
    pub command: Command,

    #[arg(skip)]
    file: FileConfig,
}

/// Settings read from the configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub network: Option<Network>,
    pub threads: Option<usize>,
    pub log_level: Option<LogLevel>,
}

/// Effective settings after merging all sources
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub network: Network,
    pub threads: usize,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Derive a secret key
    #[command(subcommand)]
    Key(KeyCommand),

    /// Generate a new mnemonic phrase
    Mnemonic {
        /// Entropy in bits: 128, 160, 192, 224 or 256
        #[arg(short, long, default_value_t = 256)]
        strength: usize,

        /// Word list language
        #[arg(long, default_value = "english")]
        language: String,
    },

    /// Convert between addresses and keys
    #[command(subcommand)]
    Address(AddressCommand),

    /// Generate or check proof-of-work
    #[command(subcommand)]
    Work(WorkCommand),

    /// Convert between difficulties and multipliers
    #[command(subcommand)]
    Difficulty(DifficultyCommand),

    /// Convert between raw and display amounts
    #[command(subcommand)]
    Amount(AmountCommand),

    /// Inspect a state block in node JSON form
    Block {
        /// Block JSON, or "-" to read it from stdin
        json: String,
    },

    /// Print the effective configuration and exit
    Config,
}

#[derive(Debug, Clone, Subcommand)]
pub enum KeyCommand {
    /// Secret key at an index of a 32-byte hex seed
    Deterministic {
        /// Seed as 64 hex characters
        seed: String,

        #[arg(short, long, default_value_t = 0)]
        index: u32,
    },

    /// Secret key at an index of a BIP39 mnemonic
    Mnemonic {
        /// Space-separated mnemonic words
        words: String,

        #[arg(short, long, default_value_t = 0)]
        index: u32,

        #[arg(short, long, default_value = "", env = "NANO_CLIENT_PASSPHRASE", hide_env_values = true)]
        passphrase: String,

        /// Word list language
        #[arg(long, default_value = "english")]
        language: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AddressCommand {
    /// Address of a public key
    Encode { public_key: String },
    /// Public key of an address
    Decode { address: String },
    /// Public key and address of a secret key
    FromSecret { secret: String },
}

/// Threshold selection shared by work commands
#[derive(Debug, Clone, Args)]
pub struct Threshold {
    /// Explicit difficulty as 16 hex characters
    #[arg(short, long, conflicts_with_all = ["multiplier", "kind"])]
    pub difficulty: Option<Difficulty>,

    /// Difficulty as a multiple of the network base difficulty
    #[arg(short, long, conflicts_with = "kind")]
    pub multiplier: Option<f64>,

    /// Use the network threshold for this block kind
    #[arg(short, long, value_enum)]
    pub kind: Option<BlockKind>,
}

impl Threshold {
    /// Resolve to a concrete difficulty on `network`
    pub fn resolve(&self, network: &Network) -> Result<Difficulty> {
        if let Some(difficulty) = self.difficulty {
            return Ok(difficulty);
        }
        if let Some(multiplier) = self.multiplier {
            return network.from_multiplier(multiplier);
        }
        Ok(match self.kind.unwrap_or_default() {
            BlockKind::Send => network.send_difficulty(),
            BlockKind::Receive => network.receive_difficulty(),
        })
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum WorkCommand {
    /// Search for work on a root hash
    Generate {
        /// Previous block hash as 64 hex characters
        root: String,

        #[command(flatten)]
        threshold: Threshold,

        /// Give up after this long, e.g. "30s" or "2m"
        #[arg(long, value_parser = humantime::parse_duration)]
        timeout: Option<Duration>,
    },

    /// Check a work value against a root hash
    Validate {
        /// Work as 16 hex characters
        work: String,

        /// Previous block hash as 64 hex characters
        root: String,

        #[command(flatten)]
        threshold: Threshold,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum DifficultyCommand {
    /// Difficulty for a multiplier of the network base
    FromMultiplier { multiplier: f64 },
    /// Multiplier of a difficulty relative to the network base
    ToMultiplier { difficulty: Difficulty },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AmountCommand {
    /// Raw units of a decimal amount
    ToRaw {
        value: String,

        /// Decimal digits to scale by [default: network exponent]
        #[arg(short, long)]
        exponent: Option<u32>,
    },
    /// Decimal amount of a raw value
    FromRaw {
        raw: u128,

        /// Decimal digits to scale by [default: network exponent]
        #[arg(short, long)]
        exponent: Option<u32>,
    },
}

impl Config {
    /// Parse the command line and load the configuration file if specified
    pub async fn load() -> Result<Self> {
        Self::parse().with_file().await
    }

    /// Load the configuration file named by `--config-file`, if any, and validate
    pub async fn with_file(mut self) -> Result<Self> {
        if let Some(config_file) = &self.config_file {
            self.file = Self::load_from_file(config_file).await?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Load configuration from file
    async fn load_from_file(path: &Path) -> Result<FileConfig> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(Error::from)
        } else {
            // Default to YAML
            serde_yaml::from_str(&content).map_err(Error::from)
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.network()?;

        let threads = self.threads();
        if threads > MAX_THREADS {
            return Err(Error::config(format!(
                "Thread count {} exceeds maximum of {}",
                threads, MAX_THREADS
            )));
        }

        Ok(())
    }

    /// Network from the file, with the command line prefix applied
    pub fn network(&self) -> Result<Network> {
        let network = self.file.network.clone().unwrap_or_default();
        match &self.prefix {
            Some(prefix) => Network::new(
                prefix.clone(),
                network.difficulty(),
                network.send_difficulty(),
                network.receive_difficulty(),
                network.exponent(),
            ),
            None => Ok(network),
        }
    }

    /// Work search threads, 0 meaning one per core
    pub fn threads(&self) -> usize {
        self.threads.or(self.file.threads).unwrap_or(0)
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.or(self.file.log_level).unwrap_or(LogLevel::Info)
    }

    /// Settings after merging command line, file and defaults
    pub fn effective(&self) -> Result<EffectiveConfig> {
        Ok(EffectiveConfig {
            network: self.network()?,
            threads: self.threads(),
            log_level: self.log_level(),
            log_format: self.log_format,
        })
    }
}
