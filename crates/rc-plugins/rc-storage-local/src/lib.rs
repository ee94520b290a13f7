//! # rc-storage-local
//! recipe-browser/crates/rc-plugins/rc-storage-local/src/lib.rs
//! Local filesystem implementation of `KeyValueStore`.
//! Each key is one file, `<root>/<key>.json`, replaced atomically on write.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use rc_core::error::{AppError, Result};
use rc_core::traits::KeyValueStore;
use tokio::fs;
use tracing::debug;

pub struct LocalKeyValueStore {
    /// Directory holding one file per key (e.g., "./data")
    root_path: PathBuf,
}

impl LocalKeyValueStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root_path: root }
    }

    /// Maps a key to its file, refusing anything that could escape the root.
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::LocalStorage(format!("invalid storage key '{key}'")));
        }
        Ok(self.root_path.join(format!("{key}.json")))
    }
}

fn io_error(action: &str, path: &std::path::Path, e: std::io::Error) -> AppError {
    AppError::LocalStorage(format!("failed to {action} {}: {e}", path.display()))
}

#[async_trait]
impl KeyValueStore for LocalKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", &path, e)),
        }
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// crash mid-write leaves the previous value intact.
    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.root_path)
            .await
            .map_err(|e| io_error("create", &self.root_path, e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .await
            .map_err(|e| io_error("write", &tmp, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error("replace", &path, e))?;

        debug!(key, path = %path.display(), bytes = value.len(), "stored local value");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove", &path, e)),
        }
    }
}
