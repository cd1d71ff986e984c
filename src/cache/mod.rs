//! Offline asset cache
//!
//! This module provides a worker that caches a fixed allowlist of static
//! resources in a versioned, on-disk cache generation. Requests are served
//! cache-first; activating a new version deletes every older generation.

mod storage;
mod worker;

pub use storage::{Cache, CacheStorage, CachedResponse};
pub use worker::{AssetCacheWorker, AssetError, AssetResponse, ResponseSource, WorkerState};
