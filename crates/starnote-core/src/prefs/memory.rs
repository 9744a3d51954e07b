//! In-memory preference store (tests and throwaway sessions)

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::{PreferenceStore, Preferences};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    files: Mutex<HashMap<String, BTreeMap<String, String>>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, file: &str) -> Result<Preferences> {
        let files = self
            .files
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        Ok(files.get(file).map_or_else(
            || Preferences::new(file),
            |values| Preferences::from_values(file, values.clone()),
        ))
    }

    fn commit(&self, prefs: &Preferences) -> Result<()> {
        let mut files = self
            .files
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        files.insert(prefs.file().to_string(), prefs.values().clone());
        Ok(())
    }
}
