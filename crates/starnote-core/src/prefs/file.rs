//! JSON-file preference store

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use super::{PreferenceStore, Preferences};
use crate::error::{Error, Result};

/// Stores each preference file as `<root>/<name>.json`
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    root: PathBuf,
}

impl FilePreferenceStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::debug!("Preference store rooted at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, file: &str) -> Result<PathBuf> {
        let valid = !file.is_empty()
            && file
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::Storage(format!(
                "invalid preference file name '{file}'"
            )));
        }
        Ok(self.root.join(format!("{file}.json")))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self, file: &str) -> Result<Preferences> {
        let path = self.path_for(file)?;
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(Preferences::new(file));
            }
            Err(error) => return Err(error.into()),
        };

        match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
            Ok(values) => Ok(Preferences::from_values(file, values)),
            Err(error) => {
                tracing::warn!(
                    "Preference file {} is unreadable, starting empty: {}",
                    path.display(),
                    error
                );
                Ok(Preferences::new(file))
            }
        }
    }

    fn commit(&self, prefs: &Preferences) -> Result<()> {
        let path = self.path_for(prefs.file())?;
        let serialized = serde_json::to_string_pretty(prefs.values())?;

        // Write a sibling then rename so readers never see a torn file.
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, serialized)?;
        std::fs::rename(&staging, &path)?;
        tracing::debug!("Committed preference file {}", path.display());
        Ok(())
    }
}
