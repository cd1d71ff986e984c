//! On-disk storage for named cache generations
//!
//! Each cache generation is a directory under the storage root named after its
//! version string. A generation holds an `index.json` mapping request URLs to
//! response metadata, plus one body file per entry. An `activated` marker file
//! records that a worker took control with that generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

const INDEX_FILE: &str = "index.json";
const ACTIVE_MARKER: &str = "activated";

/// Metadata for one cached response, as stored in the index
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    /// Body file name inside the generation directory
    file: String,
    /// HTTP status of the stored response
    status: u16,
    /// Content-Type header of the stored response
    content_type: Option<String>,
    /// When the response was stored
    cached_at: DateTime<Utc>,
}

/// A response as stored in (or read from) a cache generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// Request URL the response is keyed by
    pub url: String,
    /// HTTP status
    pub status: u16,
    /// Content-Type header, if the origin sent one
    pub content_type: Option<String>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

/// Root of all cache generations
///
/// Lives in an XDG-compliant cache directory by default
/// (`~/.cache/wxlookup/assets/` on Linux), see `AssetConfig`.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    /// Directory holding one subdirectory per generation
    root: PathBuf,
}

impl CacheStorage {
    /// Creates storage rooted at `root`; nothing is created until a cache is opened
    pub fn with_dir(root: PathBuf) -> Self {
        Self { root }
    }

    fn cache_path(&self, name: &str) -> io::Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// Opens the named cache, creating it if absent
    pub fn open(&self, name: &str) -> io::Result<Cache> {
        let dir = self.cache_path(name)?;
        fs::create_dir_all(&dir)?;
        Ok(Cache {
            name: name.to_string(),
            dir,
        })
    }

    /// Whether the named cache exists and has been activated
    pub fn is_active(&self, name: &str) -> bool {
        self.cache_path(name)
            .map(|p| p.join(ACTIVE_MARKER).is_file())
            .unwrap_or(false)
    }

    /// Records that the named cache has been activated
    pub fn mark_active(&self, name: &str) -> io::Result<()> {
        let dir = self.cache_path(name)?;
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("cache '{}' does not exist", name),
            ));
        }
        fs::write(dir.join(ACTIVE_MARKER), Utc::now().to_rfc3339())
    }

    /// Moves cache `from` to `to`, replacing any cache already named `to`
    pub fn promote(&self, from: &str, to: &str) -> io::Result<()> {
        let source = self.cache_path(from)?;
        let target = self.cache_path(to)?;
        self.delete(to)?;
        fs::rename(source, target)
    }

    /// Names of all existing caches, sorted
    pub fn keys(&self) -> io::Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Deletes the named cache with all its entries.
    ///
    /// Returns `Ok(false)` if no such cache existed.
    pub fn delete(&self, name: &str) -> io::Result<bool> {
        let dir = self.cache_path(name)?;
        match fs::remove_dir_all(dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Cache names become directory names, so keep them to a single path segment
fn validate_name(name: &str) -> io::Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid cache name '{}'", name),
        ));
    }
    Ok(())
}

/// One open cache generation
#[derive(Debug, Clone)]
pub struct Cache {
    name: String,
    dir: PathBuf,
}

impl Cache {
    /// The version name of this generation
    pub fn name(&self) -> &str {
        &self.name
    }

    fn read_index(&self) -> io::Result<BTreeMap<String, IndexEntry>> {
        let content = match fs::read_to_string(self.dir.join(INDEX_FILE)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write_index(&self, index: &BTreeMap<String, IndexEntry>) -> io::Result<()> {
        let json = serde_json::to_string_pretty(index)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // Index goes in last and by rename, so readers never see entries without bodies
        let tmp = self.dir.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&tmp, json)?;
        fs::rename(tmp, self.dir.join(INDEX_FILE))
    }

    /// Stores a batch of responses
    pub fn put_all(&self, responses: &[CachedResponse]) -> io::Result<()> {
        let mut index = self.read_index()?;
        let now = Utc::now();

        for response in responses {
            let file = match index.get(&response.url) {
                Some(existing) => existing.file.clone(),
                None => format!("entry-{}.body", index.len()),
            };
            fs::write(self.dir.join(&file), &response.body)?;
            index.insert(
                response.url.clone(),
                IndexEntry {
                    file,
                    status: response.status,
                    content_type: response.content_type.clone(),
                    cached_at: now,
                },
            );
        }

        self.write_index(&index)
    }

    /// Looks up the response stored for `url`
    pub fn lookup(&self, url: &str) -> io::Result<Option<CachedResponse>> {
        let index = self.read_index()?;
        let Some(entry) = index.get(url) else {
            return Ok(None);
        };

        let body = fs::read(self.dir.join(&entry.file))?;
        Ok(Some(CachedResponse {
            url: url.to_string(),
            status: entry.status,
            content_type: entry.content_type.clone(),
            body,
        }))
    }

    /// Request URLs stored in this generation, sorted
    pub fn keys(&self) -> io::Result<Vec<String>> {
        Ok(self.read_index()?.into_keys().collect())
    }
}
