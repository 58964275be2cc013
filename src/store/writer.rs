//! Result Writer
//!
//! Persists recovered documents and their changelogs, plus two write-only
//! informational artifacts per run: the raw spec bundle and a run manifest.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};
use crate::spec::{ExpectedTarget, SpecificationDocument};

pub const MANIFEST_FILE: &str = "sources.json";

/// Where a run got its data from
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub landing_url: String,
    pub main_bundle_url: String,
    pub data_bundle_url: String,
}

/// Files written for one matched target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTarget {
    pub staged_document: PathBuf,
    pub staged_changelog: PathBuf,
    pub storage_path: PathBuf,
}

pub struct ResultWriter {
    result_dir: PathBuf,
    cache_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(result_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            result_dir: result_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// Reset the output directories and write the informational artifacts.
    /// Each step touches two disjoint paths and runs them concurrently.
    pub async fn prepare(
        &self,
        manifest: &RunManifest,
        bundle_name: &str,
        bundle_source: &str,
    ) -> SyncResult<()> {
        tokio::try_join!(clear_dir(&self.result_dir), clear_dir(&self.cache_dir))?;
        tokio::try_join!(create_dir(&self.result_dir), create_dir(&self.cache_dir))?;

        let manifest_json = serde_json::to_string_pretty(manifest).map_err(|e| SyncError::Target {
            path: self.result_dir.join(MANIFEST_FILE),
            reason: e.to_string(),
        })?;
        tokio::try_join!(
            write_file(self.result_dir.join(MANIFEST_FILE), manifest_json + "\n"),
            write_file(self.cache_dir.join(bundle_name), bundle_source.to_string()),
        )?;

        Ok(())
    }

    /// Write the sanitized document to staging and over the tracked file, and
    /// the changelog next to the staged document.
    pub async fn persist(
        &self,
        target: &ExpectedTarget,
        document: &SpecificationDocument,
        changelog: &str,
    ) -> SyncResult<PersistedTarget> {
        let text = document.to_pretty_json().map_err(|e| SyncError::Target {
            path: target.storage_path.clone(),
            reason: e.to_string(),
        })?;

        let stem = Path::new(&target.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.file_name.clone());

        let persisted = PersistedTarget {
            staged_document: self.result_dir.join(&target.file_name),
            staged_changelog: self.result_dir.join(format!("{stem}.changelog.md")),
            storage_path: target.storage_path.clone(),
        };

        write_file(persisted.staged_document.clone(), text.clone()).await?;
        write_file(persisted.storage_path.clone(), text).await?;
        write_file(persisted.staged_changelog.clone(), changelog.to_string()).await?;

        info!("Persisted {} ({})", target.file_name, document.version());
        Ok(persisted)
    }
}

async fn clear_dir(dir: &Path) -> SyncResult<()> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::io("clear", dir, e)),
    }
}

async fn create_dir(dir: &Path) -> SyncResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| SyncError::io("create", dir, e))
}

async fn write_file(path: PathBuf, contents: String) -> SyncResult<()> {
    fs::write(&path, contents)
        .await
        .map_err(|e| SyncError::io("write", path, e))
}
