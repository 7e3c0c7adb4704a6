//! JSON File Store
//!
//! Archive and history live as two pretty-printed JSON files under one
//! directory. Unreadable JSON is treated as absent state so a damaged file
//! never bricks the engine; write failures are surfaced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use super::{PersistedState, StateStore, StoreError};
use crate::history::CycleRecord;
use crate::thought::Thought;

const ARCHIVE_FILE_NAME: &str = "archive.json";
const HISTORY_FILE_NAME: &str = "history.json";

/// File-backed state store.
#[derive(Debug)]
pub struct JsonFileStore {
    archive_path: PathBuf,
    history_path: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| StoreError::io("create_dir", dir.display().to_string(), &e))?;

        Ok(Self {
            archive_path: dir.join(ARCHIVE_FILE_NAME),
            history_path: dir.join(HISTORY_FILE_NAME),
        })
    }

    /// Read and parse one JSON file, treating absence or damage as `None`.
    async fn read_json<T: serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<Option<T>, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io("read", path.display().to_string(), &e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable state file, starting from empty state"
                );
                Ok(None)
            }
        }
    }

    async fn write_json<T: serde::Serialize + ?Sized>(
        path: &Path,
        value: &T,
    ) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(value).map_err(|e| StoreError::serialization(&e))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| StoreError::io("write", path.display().to_string(), &e))
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    #[tracing::instrument(skip(self))]
    async fn load(&self) -> Result<PersistedState, StoreError> {
        let archive: BTreeMap<String, Thought> = Self::read_json(&self.archive_path)
            .await?
            .unwrap_or_default();
        let history: Vec<CycleRecord> = Self::read_json(&self.history_path)
            .await?
            .unwrap_or_default();

        Ok(PersistedState { archive, history })
    }

    #[tracing::instrument(skip_all, fields(cells = archive.len()))]
    async fn save_archive(&self, archive: &BTreeMap<String, Thought>) -> Result<(), StoreError> {
        Self::write_json(&self.archive_path, archive).await
    }

    #[tracing::instrument(skip_all, fields(records = history.len()))]
    async fn save_history(&self, history: &[CycleRecord]) -> Result<(), StoreError> {
        Self::write_json(&self.history_path, history).await
    }

    fn name(&self) -> &'static str {
        "json-file"
    }

    fn is_simulation(&self) -> bool {
        false
    }
}

// =============================================================================
// Tests
// =============================================================================
