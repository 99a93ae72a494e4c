use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::KeyValueStore;
use crate::error::{FleetError, Result};

const VALUE_EXT: &str = ".json";

/// Production file-based store: each key lives in its own file under a root
/// directory (`<root>/<key>.json`).
///
/// Writes go to a `.tmp` sibling first and are renamed into place, so a
/// partial write never replaces a previously valid value.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        // Keys double as file names, so keep them to a safe alphabet.
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(FleetError::Store(format!("invalid store key: {key:?}")));
        }
        Ok(self.root.join(format!("{key}{VALUE_EXT}")))
    }

    async fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).await.map_err(FleetError::Io)?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FleetError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        self.ensure_root().await?;

        let tmp = self.root.join(format!(".{key}{VALUE_EXT}.tmp"));
        fs::write(&tmp, value).await.map_err(FleetError::Io)?;
        fs::rename(&tmp, &path).await.map_err(FleetError::Io)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FleetError::Io(e)),
        }
    }

    async fn clear(&self) -> Result<()> {
        if !self.root.exists() {
            return Ok(());
        }
        let mut entries = fs::read_dir(&self.root).await.map_err(FleetError::Io)?;
        while let Some(entry) = entries.next_entry().await.map_err(FleetError::Io)? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            // Only this store's value files; leave anything else alone.
            if name.ends_with(VALUE_EXT) && !name.starts_with('.') {
                fs::remove_file(entry.path()).await.map_err(FleetError::Io)?;
            }
        }
        Ok(())
    }
}
