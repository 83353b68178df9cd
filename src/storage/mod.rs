//! Device-local key/value storage
//!
//! A small string-keyed store persisted as a single JSON object on disk,
//! used for the user preference blob and the first-visit flag. Every write
//! rewrites the whole file through a temporary sibling and a rename.

use crate::error::{GuideError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File-backed key/value store
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Open the store in the user's data directory
    ///
    /// # Errors
    ///
    /// Returns `GuideError::Storage` when the data directory cannot be
    /// determined or created
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "culture-guide", "culture-guide")
            .ok_or_else(|| GuideError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("preferences.json"))
    }

    /// Open the store at an explicit file path
    ///
    /// The parent directory is created when missing; the file itself is only
    /// created on the first write.
    ///
    /// # Examples
    ///
    /// ```
    /// use culture_guide::storage::LocalStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = LocalStorage::new_with_path(dir.path().join("prefs.json")).unwrap();
    /// assert_eq!(storage.get_item("visited").unwrap(), None);
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for preference store")
                    .map_err(|e| GuideError::Storage(format!("{:#}", e)))?;
            }
        }

        tracing::debug!("Using preference store at {}", path.display());
        Ok(Self { path })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but is unreadable or is not a
    /// JSON object of strings
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    /// Write a value, replacing any previous one
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all_or_empty();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    /// Remove a value; removing an absent key is not an error
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.read_all_or_empty();
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read preference store")
            .map_err(|e| GuideError::Storage(format!("{:#}", e)))?;

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let items = serde_json::from_str(&contents)
            .context("Preference store is not a JSON object of strings")
            .map_err(|e| GuideError::Storage(format!("{:#}", e)))?;
        Ok(items)
    }

    /// A corrupt file is replaced on the next write rather than blocking it
    fn read_all_or_empty(&self) -> BTreeMap<String, String> {
        self.read_all().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable preference store: {}", e);
            BTreeMap::new()
        })
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(items)
            .context("Failed to serialize preference store")
            .map_err(|e| GuideError::Storage(format!("{:#}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .context("Failed to write preference store")
            .map_err(|e| GuideError::Storage(format!("{:#}", e)))?;
        std::fs::rename(&tmp_path, &self.path)
            .context("Failed to replace preference store")
            .map_err(|e| GuideError::Storage(format!("{:#}", e)))?;

        Ok(())
    }
}
