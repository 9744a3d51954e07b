//! Key-value preference files
//!
//! Every piece of local state lives in a small named file of string keys and
//! string values. A file is always loaded and committed whole, so every key
//! written by one `commit` lands together or not at all.

mod file;
mod memory;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub use file::FilePreferenceStore;
pub use memory::MemoryPreferenceStore;

/// Backing storage for named preference files
pub trait PreferenceStore: Send + Sync {
    /// Load every key of `file`; a file that was never committed is empty
    fn load(&self, file: &str) -> Result<Preferences>;

    /// Replace the stored contents of `prefs.file()` with `prefs`
    fn commit(&self, prefs: &Preferences) -> Result<()>;
}

/// In-memory view of one preference file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    file: String,
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// Create an empty view of `file`
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            values: BTreeMap::new(),
        }
    }

    pub(crate) fn from_values(file: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            file: file.into(),
            values,
        }
    }

    pub(crate) const fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a key, returning whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_string(key)?.trim().parse().ok()
    }

    pub fn put_i64(&mut self, key: impl Into<String>, value: i64) {
        self.put_string(key, value.to_string());
    }

    /// Decode a JSON value stored under `key`
    ///
    /// Malformed data is logged and reported as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_string(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(
                    "Discarding malformed value for '{}' in preference file '{}': {}",
                    key,
                    self.file,
                    error
                );
                None
            }
        }
    }

    pub fn put_json<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        self.put_string(key, encoded);
        Ok(())
    }
}
