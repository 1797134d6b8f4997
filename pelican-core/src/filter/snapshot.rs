use crate::filter::{Filter, FilterStore, RegistryError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotDocument {
    version: u32,
    filters: Vec<Filter>,
}

/// On-disk copy of the whole filter table.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read persisted filters. A missing file is an empty registry.
    pub fn load(&self) -> Result<Vec<Filter>, RegistryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no snapshot found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RegistryError::persistence(&self.path, e)),
        };

        let doc: SnapshotDocument =
            serde_json::from_str(&raw).map_err(|e| RegistryError::CorruptSnapshot {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if doc.version != SNAPSHOT_VERSION {
            return Err(RegistryError::CorruptSnapshot {
                path: self.path.clone(),
                reason: format!("unsupported version {}", doc.version),
            });
        }

        Ok(doc.filters)
    }

    /// Write the store atomically: temp file in the same directory, then rename.
    pub fn save(&self, store: &FilterStore) -> Result<usize, RegistryError> {
        let doc = SnapshotDocument {
            version: SNAPSHOT_VERSION,
            filters: store.export(),
        };
        let body = serde_json::to_vec_pretty(&doc).map_err(|e| {
            RegistryError::persistence(&self.path, std::io::Error::new(ErrorKind::InvalidData, e))
        })?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp =
            NamedTempFile::new_in(&dir).map_err(|e| RegistryError::persistence(&self.path, e))?;
        tmp.write_all(&body)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| RegistryError::persistence(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| RegistryError::persistence(&self.path, e.error))?;

        Ok(doc.filters.len())
    }
}
