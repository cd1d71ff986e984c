//! Command-line interface parsing for wxlookup
//!
//! Flags override the defaults in `config`. Without a subcommand the terminal
//! UI starts; the `assets` subcommand drives the offline asset cache instead.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{parse_url, AssetConfig, Config, ConfigError};

/// wxlookup - current weather and forecast with city autocomplete
#[derive(Parser, Debug)]
#[command(name = "wxlookup")]
#[command(about = "Weather lookup with city autocomplete and an offline asset cache")]
#[command(version)]
pub struct Cli {
    /// Skip the startup geolocation lookup
    #[arg(long)]
    pub no_locate: bool,

    /// Quiet period before a city search fires, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 300)]
    pub debounce_ms: u64,

    /// Write logs to this file instead of the default one in the cache directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the offline asset cache
    Assets(AssetArgs),
}

#[derive(clap::Args, Debug)]
pub struct AssetArgs {
    /// Directory holding the cache generations
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Origin that relative allowlist entries resolve against
    #[arg(long, value_name = "URL", global = true)]
    pub origin: Option<String>,

    /// Cache version to install or serve from
    #[arg(long, value_name = "NAME", global = true)]
    pub cache_version: Option<String>,

    #[command(subcommand)]
    pub action: AssetAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AssetAction {
    /// Fetch the allowlist into the current version and delete older versions
    Install,
    /// Serve one request cache-first and write the body to stdout
    Get {
        /// Absolute URL, or a path relative to the origin
        url: String,
    },
    /// List cache versions and their entries
    List,
}

impl Cli {
    /// Controller configuration derived from the flags
    pub fn config(&self) -> Config {
        Config {
            debounce: Duration::from_millis(self.debounce_ms),
            locate_on_start: !self.no_locate,
            ..Config::default()
        }
    }
}

impl AssetArgs {
    /// Asset cache configuration derived from the flags
    pub fn config(&self) -> Result<AssetConfig, ConfigError> {
        let mut config = match &self.cache_dir {
            Some(dir) => AssetConfig::with_root(dir.clone())?,
            None => AssetConfig::new()?,
        };
        if let Some(origin) = &self.origin {
            config.origin = parse_url(origin)?;
        }
        if let Some(version) = &self.cache_version {
            config.cache_version = version.clone();
        }
        Ok(config)
    }
}
