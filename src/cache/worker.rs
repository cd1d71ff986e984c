//! Asset cache worker
//!
//! Keeps a fixed allowlist of static resources available offline. The worker
//! moves through three states:
//!
//! - `Installing`: `install` fetches every allowlisted resource into a staging
//!   generation and renames it to the configured version once the whole set
//!   is stored. Any single failure removes the staging generation and makes
//!   the worker `Redundant`; existing generations are left untouched.
//! - `Active`: entered through `activate`, which marks the generation active
//!   and deletes every other one. Requests are served cache-first.
//! - `Redundant`: the worker failed to install and serves nothing.

use std::fmt;
use std::io;

use futures::future::try_join_all;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::storage::{CacheStorage, CachedResponse};
use crate::config::AssetConfig;

/// Lifecycle state of the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Active,
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Installing => "installing",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Errors raised by the asset cache worker
#[derive(Debug, Error)]
pub enum AssetError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// An allowlisted resource answered with a non-success status
    #[error("Fetching {url} returned status {status}")]
    BadStatus { url: String, status: u16 },

    /// Reading or writing the cache failed
    #[error("Cache I/O failed: {0}")]
    Io(#[from] io::Error),

    /// An allowlist entry or request URL could not be resolved
    #[error("Invalid URL '{entry}': {source}")]
    InvalidUrl {
        entry: String,
        #[source]
        source: url::ParseError,
    },

    /// The operation is not allowed in the worker's current state
    #[error("Worker is {0}")]
    WrongState(WorkerState),

    /// The cache generation has not been installed
    #[error("Cache '{0}' is not installed")]
    NotInstalled(String),
}

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
}

/// A response served by the worker
#[derive(Debug, Clone)]
pub struct AssetResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub source: ResponseSource,
}

impl AssetResponse {
    fn from_cache(cached: CachedResponse) -> Self {
        Self {
            url: cached.url,
            status: cached.status,
            content_type: cached.content_type,
            body: cached.body,
            source: ResponseSource::Cache,
        }
    }
}

/// Serves the allowlisted assets from a versioned cache
#[derive(Debug)]
pub struct AssetCacheWorker {
    version: String,
    origin: Url,
    /// Allowlist resolved against the origin
    urls: Vec<Url>,
    storage: CacheStorage,
    client: Client,
    state: WorkerState,
    installed: bool,
}

impl AssetCacheWorker {
    /// Creates a worker in the `Installing` state
    pub fn new(config: &AssetConfig, client: Client) -> Result<Self, AssetError> {
        let urls = config
            .allowlist
            .iter()
            .map(|entry| resolve(&config.origin, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: config.cache_version.clone(),
            origin: config.origin.clone(),
            urls,
            storage: CacheStorage::with_dir(config.cache_root.clone()),
            client,
            state: WorkerState::Installing,
            installed: false,
        })
    }

    /// Attaches to a generation a previous run installed and activated.
    ///
    /// The worker starts `Active`; fails with `NotInstalled` unless the
    /// current version was activated.
    pub fn resume(config: &AssetConfig, client: Client) -> Result<Self, AssetError> {
        let mut worker = Self::new(config, client)?;
        if !worker.storage.is_active(&worker.version) {
            return Err(AssetError::NotInstalled(worker.version));
        }
        worker.installed = true;
        worker.state = WorkerState::Active;
        Ok(worker)
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Allowlisted URLs, resolved against the origin
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// Fetches every allowlisted resource and stores them as one batch.
    ///
    /// All-or-nothing: if any fetch fails nothing is stored and the worker
    /// becomes `Redundant`. Returns the number of stored entries.
    pub async fn install(&mut self) -> Result<usize, AssetError> {
        if self.state != WorkerState::Installing {
            return Err(AssetError::WrongState(self.state));
        }
        tracing::info!(version = %self.version, assets = self.urls.len(), "installing asset cache");

        match self.populate().await {
            Ok(count) => {
                self.installed = true;
                tracing::info!(version = %self.version, count, "asset cache installed");
                Ok(count)
            }
            Err(e) => {
                self.state = WorkerState::Redundant;
                tracing::warn!(version = %self.version, error = %e, "asset cache install failed");
                if let Err(cleanup) = self.storage.delete(&self.staging_name()) {
                    tracing::warn!(error = %cleanup, "failed to remove staged asset cache");
                }
                Err(e)
            }
        }
    }

    fn staging_name(&self) -> String {
        format!("{}.installing", self.version)
    }

    async fn populate(&self) -> Result<usize, AssetError> {
        let staging = self.staging_name();
        self.storage.delete(&staging)?;
        let cache = self.storage.open(&staging)?;
        let responses = try_join_all(self.urls.iter().map(|url| self.fetch_asset(url))).await?;
        cache.put_all(&responses)?;
        self.storage.promote(&staging, &self.version)?;
        Ok(responses.len())
    }

    async fn fetch_asset(&self, url: &Url) -> Result<CachedResponse, AssetError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = header_value(&response);
        let body = response.bytes().await?.to_vec();
        Ok(CachedResponse {
            url: url.to_string(),
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    /// Takes control and deletes every cache generation except the current one.
    ///
    /// The current generation is marked active first, so a later `resume`
    /// finds it even if deleting the others fails.
    ///
    /// Returns the names of the deleted generations.
    pub fn activate(&mut self) -> Result<Vec<String>, AssetError> {
        if self.state != WorkerState::Installing {
            return Err(AssetError::WrongState(self.state));
        }
        if !self.installed {
            return Err(AssetError::NotInstalled(self.version.clone()));
        }
        self.storage.mark_active(&self.version)?;

        let mut deleted = Vec::new();
        for name in self.storage.keys()? {
            if name != self.version && self.storage.delete(&name)? {
                tracing::info!(cache = %name, "deleted stale asset cache");
                deleted.push(name);
            }
        }

        self.state = WorkerState::Active;
        Ok(deleted)
    }

    /// Serves a request cache-first.
    ///
    /// A cached response is returned as stored, without revalidation. On a
    /// miss the live response is returned and not added to the cache.
    pub async fn fetch(&self, request: &str) -> Result<AssetResponse, AssetError> {
        if self.state != WorkerState::Active {
            return Err(AssetError::WrongState(self.state));
        }

        let url = resolve(&self.origin, request)?;
        let cache = self.storage.open(&self.version)?;
        if let Some(cached) = cache.lookup(url.as_str())? {
            tracing::debug!(%url, "served from cache");
            return Ok(AssetResponse::from_cache(cached));
        }

        tracing::debug!(%url, "cache miss, fetching from network");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let content_type = header_value(&response);
        let body = response.bytes().await?.to_vec();

        Ok(AssetResponse {
            url: url.to_string(),
            status,
            content_type,
            body,
            source: ResponseSource::Network,
        })
    }
}

fn resolve(origin: &Url, entry: &str) -> Result<Url, AssetError> {
    origin.join(entry).map_err(|source| AssetError::InvalidUrl {
        entry: entry.to_string(),
        source,
    })
}

fn header_value(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(allowlist: &[&str]) -> AssetConfig {
        let mut config =
            AssetConfig::with_root(PathBuf::from("/nonexistent/wxlookup")).expect("valid defaults");
        config.allowlist = allowlist.iter().map(|s| s.to_string()).collect();
        config
    }

    #[test]
    fn test_allowlist_resolves_against_origin() {
        let worker = AssetCacheWorker::new(
            &config(&["./", "index.html", "https://cdn.example.com/a.css"]),
            Client::new(),
        )
        .expect("worker should build");

        let urls: Vec<&str> = worker.urls().iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:8080/",
                "http://localhost:8080/index.html",
                "https://cdn.example.com/a.css"
            ]
        );
        assert_eq!(worker.state(), WorkerState::Installing);
    }

    #[test]
    fn test_activate_before_install_is_rejected() {
        let mut worker =
            AssetCacheWorker::new(&config(&["index.html"]), Client::new()).expect("worker");

        match worker.activate() {
            Err(AssetError::NotInstalled(version)) => assert_eq!(version, "weather-app-cache-v1"),
            other => panic!("Expected NotInstalled, got {:?}", other),
        }
        assert_eq!(worker.state(), WorkerState::Installing);
    }

    #[tokio::test]
    async fn test_fetch_requires_active_worker() {
        let worker =
            AssetCacheWorker::new(&config(&["index.html"]), Client::new()).expect("worker");

        let result = worker.fetch("index.html").await;
        assert!(matches!(
            result,
            Err(AssetError::WrongState(WorkerState::Installing))
        ));
    }

    #[test]
    fn test_worker_state_display() {
        assert_eq!(WorkerState::Installing.to_string(), "installing");
        assert_eq!(WorkerState::Active.to_string(), "active");
        assert_eq!(WorkerState::Redundant.to_string(), "redundant");
    }
}
