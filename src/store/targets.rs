//! Target Store
//!
//! Reads the tracked specification files. Every `*.json` file in the target
//! directory is one expected target.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::spec::{ExpectedTarget, SpecificationDocument};

pub struct TargetStore {
    dir: PathBuf,
}

impl TargetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All targets, sorted by file name.
    pub async fn load(&self) -> SyncResult<Vec<ExpectedTarget>> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| SyncError::io("read directory", &self.dir, e))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SyncError::io("read directory", &self.dir, e))?
        {
            let path = entry.path();
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            if is_json && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut targets = Vec::with_capacity(paths.len());
        for path in paths {
            targets.push(Self::read_target(path).await?);
        }

        debug!("Loaded {} expected targets from {}", targets.len(), self.dir.display());
        Ok(targets)
    }

    async fn read_target(path: PathBuf) -> SyncResult<ExpectedTarget> {
        let text = fs::read_to_string(&path)
            .await
            .map_err(|e| SyncError::io("read", &path, e))?;
        let current: SpecificationDocument =
            serde_json::from_str(&text).map_err(|e| SyncError::Target {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ExpectedTarget {
            file_name,
            storage_path: path,
            current,
        })
    }
}
