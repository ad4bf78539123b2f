use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sled::Tree;
use thiserror::Error;
use tracing::{debug, warn};

/// Tree holding every application value.
const NAMESPACE: &str = "device_data";

/// Failure to reach the store or to convert a value to or from JSON.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Db(#[from] sled::Error),

    #[error("stored value could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Named application values kept across restarts.
///
/// Clones share the same underlying tree.
#[derive(Clone)]
pub struct DeviceStore {
    tree: Tree,
}

impl DeviceStore {
    /// Opens or creates the store in the directory at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let tree = sled::open(path)?.open_tree(NAMESPACE)?;
        Ok(Self { tree })
    }

    /// Reads `name`. `Ok(None)` when nothing is stored under it.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        match self.tree.get(name)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Returns the stored value, or stores and returns `default` when the
    /// name is missing or its value cannot be read back as `T`.
    pub fn get_or_init<T>(&self, name: &str, default: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        match self.get(name) {
            Ok(Some(value)) => return value,
            Ok(None) => debug!(name, "no stored value, initializing"),
            Err(e) => warn!(name, "stored value unreadable, reinitializing: {e}"),
        }
        if let Err(e) = self.set(name, &default) {
            warn!(name, "could not store default: {e}");
        }
        default
    }

    /// Stores `value` under `name`, replacing any previous value, and
    /// flushes before returning.
    pub fn set<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        self.tree.insert(name, bytes)?;
        self.tree.flush()?;
        Ok(())
    }

    /// Removes `name`. Removing a missing name is not an error.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.tree.remove(name)?;
        self.tree.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for DeviceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceStore")
            .field("tree", &NAMESPACE)
            .field("entries", &self.tree.len())
            .finish()
    }
}
