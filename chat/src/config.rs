use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::presence::PresenceConfig;

/// Command line options.
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory holding local storage.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Enable or disable logging (true/false).
    #[arg(long)]
    pub logging: Option<bool>,
    /// Enable or disable simulated messages from other members (true/false).
    #[arg(long)]
    pub simulator: Option<bool>,
    /// Seed for the simulator's random draws.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Runtime configuration resolved from file, env and CLI.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory for the local key-value store.
    pub data_dir: PathBuf,
    /// Whether verbose logging is enabled.
    pub logging_enabled: bool,
    /// Simulator settings; `None` when disabled.
    pub presence: Option<PresenceConfig>,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    storage: FileStorage,
    #[serde(default)]
    logging: FileLogging,
    #[serde(default)]
    presence: FilePresence,
}

#[derive(Deserialize, Default)]
struct FileStorage {
    #[serde(default)]
    dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct FileLogging {
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Deserialize)]
struct FilePresence {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_interval_secs")]
    interval_secs: u64,
    #[serde(default = "default_probability")]
    probability: f64,
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    10
}

fn default_probability() -> f64 {
    0.3
}

impl Default for FileLogging {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for FilePresence {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_secs: default_interval_secs(),
            probability: default_probability(),
        }
    }
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| v.parse::<bool>().ok())
}

impl Config {
    /// Resolve configuration from CLI, environment variables, config file and defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        // config file path precedence: CLI -> ENV -> default
        let config_path = cli
            .config
            .clone()
            .or_else(|| std::env::var("LOUNGE_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("config/lounge.toml"));

        let file_cfg = match fs::read(&config_path) {
            Ok(bytes) => {
                let contents = String::from_utf8_lossy(&bytes);
                toml::from_str::<FileConfig>(&contents).context("invalid config file")?
            }
            Err(_) => FileConfig::default(),
        };

        let mut data_dir = file_cfg.storage.dir;
        let mut logging = file_cfg.logging.enabled;
        let mut simulator = file_cfg.presence.enabled;

        // environment overrides
        if let Ok(dir) = std::env::var("LOUNGE_DATA_DIR") {
            data_dir = Some(PathBuf::from(dir));
        }
        if let Some(l) = env_bool("LOUNGE_LOGGING") {
            logging = l;
        }
        if let Some(s) = env_bool("LOUNGE_SIMULATOR") {
            simulator = s;
        }

        // CLI overrides
        if let Some(dir) = &cli.data_dir {
            data_dir = Some(dir.clone());
        }
        if let Some(l) = cli.logging {
            logging = l;
        }
        if let Some(s) = cli.simulator {
            simulator = s;
        }

        let presence = PresenceConfig {
            interval: Duration::from_secs(file_cfg.presence.interval_secs),
            probability: file_cfg.presence.probability,
            seed: cli.seed,
        };
        presence.validate()?;

        Ok(Self {
            data_dir: data_dir.unwrap_or_else(lounge_core::services::storage::default_data_dir),
            logging_enabled: logging,
            presence: simulator.then_some(presence),
        })
    }
}
