//! Runtime configuration
//!
//! Defaults live here; command-line flags override them (see `cli`).

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use thiserror::Error;
use url::Url;

use crate::data::geocode::{DEFAULT_SUGGESTION_LIMIT, NOMINATIM_SEARCH_URL};
use crate::data::geolocation::IPAPI_URL;
use crate::data::weather::OPEN_METEO_BASE_URL;

/// Version name of the asset cache generation this build installs
pub const CACHE_VERSION: &str = "weather-app-cache-v1";

/// Origin the local app-shell entries are resolved against
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080/";

/// Resources cached at install time: the app shell plus two external stylesheets
pub const ASSET_ALLOWLIST: &[&str] = &[
    "./",
    "index.html",
    "style.css",
    "script.js",
    "manifest.json",
    "icon_192.png",
    "icon_512.png",
    "https://cdnjs.cloudflare.com/ajax/libs/bootstrap/5.1.3/css/bootstrap.min.css",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0-beta3/css/all.min.css",
];

/// Errors raised while assembling configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An endpoint or origin is not a valid absolute URL
    #[error("Invalid URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// No cache directory could be determined and none was given
    #[error("Could not determine a cache directory; pass --cache-dir")]
    NoCacheDir,
}

/// Settings for the weather controller
#[derive(Debug, Clone)]
pub struct Config {
    /// Geolocation-by-IP endpoint
    pub geolocation_url: String,
    /// Weather forecast endpoint
    pub weather_url: String,
    /// City search endpoint
    pub geocode_url: String,
    /// Quiet period before a suggestion request fires
    pub debounce: Duration,
    /// How long a toast stays visible
    pub toast_duration: Duration,
    /// Maximum number of city suggestions
    pub suggestion_limit: usize,
    /// Minimum trimmed query length (exclusive) before searching
    pub min_query_len: usize,
    /// User-Agent sent to the providers (Nominatim requires one)
    pub user_agent: String,
    /// Whether to geolocate and fetch weather at startup
    pub locate_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geolocation_url: IPAPI_URL.to_string(),
            weather_url: OPEN_METEO_BASE_URL.to_string(),
            geocode_url: NOMINATIM_SEARCH_URL.to_string(),
            debounce: Duration::from_millis(300),
            toast_duration: Duration::from_secs(3),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            min_query_len: 2,
            user_agent: concat!("wxlookup/", env!("CARGO_PKG_VERSION")).to_string(),
            locate_on_start: true,
        }
    }
}

/// Settings for the asset cache worker
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Name of the cache generation to install
    pub cache_version: String,
    /// Origin that relative allowlist entries are resolved against
    pub origin: Url,
    /// Resources to cache at install time
    pub allowlist: Vec<String>,
    /// Directory holding all cache generations
    pub cache_root: PathBuf,
}

impl AssetConfig {
    /// Builds the default configuration rooted in the XDG cache directory
    ///
    /// Uses `~/.cache/wxlookup/assets` on Linux, or the equivalent elsewhere.
    pub fn new() -> Result<Self, ConfigError> {
        let cache_root = default_cache_dir().ok_or(ConfigError::NoCacheDir)?;
        Self::with_root(cache_root.join("assets"))
    }

    /// Default allowlist and version with a custom cache directory
    pub fn with_root(cache_root: PathBuf) -> Result<Self, ConfigError> {
        Ok(Self {
            cache_version: CACHE_VERSION.to_string(),
            origin: parse_url(DEFAULT_ORIGIN)?,
            allowlist: ASSET_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
            cache_root,
        })
    }
}

/// XDG-compliant cache directory for wxlookup, if one can be determined
pub fn default_cache_dir() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "wxlookup")?;
    Some(project_dirs.cache_dir().to_path_buf())
}

/// Parses an absolute URL, reporting the offending value on failure
pub fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        value: value.to_string(),
        source,
    })
}
