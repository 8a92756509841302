//! Persistent memoisation of expensive per-congress results.
//!
//! A result is stored under the SHA-256 digest of a [`CacheKey`]: the name of
//! the computation, a version tag and its arguments. Changing the version
//! tag is how a computation invalidates everything it stored before.

use crate::errors::PipelineError;
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheKey {
    pub function: &'static str,
    pub version: u32,
    pub args: String,
}

impl CacheKey {
    pub fn new(function: &'static str, version: u32, args: impl Serialize) -> Result<Self, PipelineError> {
        let args = serde_json::to_string(&args).map_err(|e| PipelineError::Store(e.to_string()))?;
        Ok(CacheKey { function, version, args })
    }

    /// Lowercase hex SHA-256 of `function`, `version` and `args`.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.function.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.args.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

/// Raw byte storage keyed by [`CacheKey`].
pub trait ResultStore {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, PipelineError>;
    fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), PipelineError>;
}

/// One file per key under `dir`. Entries never expire.
#[derive(Clone, Debug)]
pub struct DiskResultStore {
    pub dir: PathBuf,
}

impl DiskResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DiskResultStore { dir: dir.into() }
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.function).join(format!("{}.json", key.digest()))
    }
}

fn store_error(error: impl std::fmt::Display) -> PipelineError {
    PipelineError::Store(error.to_string())
}

impl ResultStore for DiskResultStore {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, PipelineError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(store_error(error)),
        }
    }

    fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), PipelineError> {
        let path = self.path_for(key);
        let parent = path.parent().unwrap_or(&self.dir);
        fs::create_dir_all(parent).map_err(store_error)?;
        let mut staging = tempfile::NamedTempFile::new_in(parent).map_err(store_error)?;
        std::io::Write::write_all(&mut staging, value).map_err(store_error)?;
        staging.persist(&path).map_err(store_error)?;
        Ok(())
    }
}

/// Keeps results for the lifetime of the store.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryResultStore {
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryResultStore {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, PipelineError> {
        let entries = self.entries.lock().map_err(store_error)?;
        Ok(entries.get(&key.digest()).cloned())
    }

    fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), PipelineError> {
        let mut entries = self.entries.lock().map_err(store_error)?;
        entries.insert(key.digest(), value.to_vec());
        Ok(())
    }
}

/// Stores nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullStore;

impl ResultStore for NullStore {
    fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>, PipelineError> {
        Ok(None)
    }

    fn put(&self, _key: &CacheKey, _value: &[u8]) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Returns the stored result for `key`, or runs `compute` and stores what it
/// returns. Failures are not stored. An entry that no longer deserialises is
/// recomputed and replaced.
pub fn memoize<T, F>(store: &dyn ResultStore, key: &CacheKey, compute: F) -> Result<T, PipelineError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, PipelineError>,
{
    if let Some(bytes) = store.get(key)? {
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                tracing::debug!(function = key.function, args = %key.args, "result store hit");
                return Ok(value);
            },
            Err(error) => {
                tracing::warn!(function = key.function, %error, "discarding unreadable stored result");
            },
        }
    }
    let value = compute()?;
    let bytes = serde_json::to_vec(&value).map_err(store_error)?;
    store.put(key, &bytes)?;
    Ok(value)
}
