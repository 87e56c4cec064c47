//! JSON-file backed state store.
//!
//! Storage location: `~/.mindgrid/state.json` unless a state directory is
//! configured.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{StateStore, StoreError};

/// Default filename for persisted state
pub const STATE_FILE: &str = "state.json";

/// State file backed by a flat JSON object of string values.
#[derive(Debug, Clone)]
pub struct FileStore {
    file_path: PathBuf,
}

impl FileStore {
    /// Store at `<dir>/state.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_path(dir.join(STATE_FILE))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { file_path: path }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.file_path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.file_path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Current map for a read-modify-write, and whether a corrupt file was
    /// discarded. The next write replaces a discarded file.
    fn read_map_for_update(&self) -> Result<(BTreeMap<String, String>, bool), StoreError> {
        match self.read_map() {
            Ok(map) => Ok((map, false)),
            Err(StoreError::Json(e)) => {
                tracing::warn!(path = %self.file_path.display(), error = %e, "discarding corrupt state file");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    /// Write via a sibling temp file and rename, so readers never see a
    /// partial file.
    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(map)?;
        let tmp_path = self.file_path.with_extension("json.tmp");
        match fs::remove_file(&tmp_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        // Holds a bearer token: user-only on Unix from the moment it exists
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.file_path)?;
        Ok(())
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value.to_string())])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let (mut map, _) = self.read_map_for_update()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        tracing::trace!(path = %self.file_path.display(), count = entries.len(), "state written");
        self.write_map(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let (mut map, discarded) = self.read_map_for_update()?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before && !discarded {
            return Ok(());
        }
        self.write_map(&map)
    }
}
