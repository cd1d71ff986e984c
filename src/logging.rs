//! Tracing setup
//!
//! The filter comes from `RUST_LOG` and defaults to `info`. The terminal UI
//! owns the screen, so it logs to a file; the `assets` commands log to stderr.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::default_cache_dir;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Default log file used by the terminal UI
pub fn default_log_path() -> Option<PathBuf> {
    default_cache_dir().map(|dir| dir.join("wxlookup.log"))
}

/// Reports whether the subscriber was installed; a second init keeps the first
fn installed(result: Result<(), Box<dyn std::error::Error + Send + Sync>>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "tracing subscriber already installed");
            false
        }
    }
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Sends logs to `path` (appending). Without a path, logging stays off.
pub fn init_file(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = open_log(path)?;

    installed(
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
    );

    tracing::info!(log = %path.display(), "wxlookup started");
    Ok(())
}

/// Sends logs to stderr. Returns false if a subscriber was already installed.
pub fn init_stderr() -> bool {
    installed(
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(io::stderr)
            .try_init(),
    )
}
