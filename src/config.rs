//! Configuration
//!
//! Read from the process environment, after an optional `.env` file has been
//! loaded by the binary.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{SyncError, SyncResult};

/// Prefix/suffix pair identifying a content-hashed bundle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePattern {
    pub prefix: String,
    pub suffix: String,
}

impl BundlePattern {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

impl std::fmt::Display for BundlePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.prefix, self.suffix)
    }
}

/// Configuration for a sync run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Landing page of the documentation site
    pub source_url: String,
    /// Endpoint of the changelog service
    pub diff_url: String,
    /// Directory holding the tracked specification files
    pub target_dir: PathBuf,
    /// Staging directory for recovered documents and changelogs
    pub result_dir: PathBuf,
    /// Write-only cache of the raw spec bundle
    pub cache_dir: PathBuf,
    pub main_bundle: BundlePattern,
    pub data_bundle: BundlePattern,
    pub sandbox_timeout: Duration,
    pub sandbox_memory_bytes: usize,
    pub http_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            diff_url: String::new(),
            target_dir: PathBuf::from("specs"),
            result_dir: PathBuf::from("results"),
            cache_dir: PathBuf::from(".cache"),
            main_bundle: BundlePattern::new("/assets/index-", ".js"),
            data_bundle: BundlePattern::new("assets/openapi-", ".js"),
            sandbox_timeout: Duration::from_secs(10),
            sandbox_memory_bytes: 256 * 1024 * 1024,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl SyncConfig {
    /// Build the configuration from `SPEC_SYNC_*` environment variables.
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| SyncError::Config(format!("{key} is not set")))
        };
        let seconds = |key: &str, fallback: Duration| -> SyncResult<Duration> {
            match get(key) {
                Some(raw) => parse_number(key, &raw).map(Duration::from_secs),
                None => Ok(fallback),
            }
        };

        let sandbox_memory_bytes = match get("SPEC_SYNC_SANDBOX_MEMORY_MB") {
            Some(raw) => {
                let megabytes = parse_number("SPEC_SYNC_SANDBOX_MEMORY_MB", &raw)?;
                usize::try_from(megabytes)
                    .ok()
                    .and_then(|mb| mb.checked_mul(1024 * 1024))
                    .ok_or_else(|| {
                        SyncError::Config(format!("SPEC_SYNC_SANDBOX_MEMORY_MB is too large: '{raw}'"))
                    })?
            }
            None => defaults.sandbox_memory_bytes,
        };

        Ok(Self {
            source_url: required("SPEC_SYNC_SOURCE_URL")?,
            diff_url: required("SPEC_SYNC_DIFF_URL")?,
            target_dir: get("SPEC_SYNC_TARGET_DIR").map(PathBuf::from).unwrap_or(defaults.target_dir),
            result_dir: get("SPEC_SYNC_RESULT_DIR").map(PathBuf::from).unwrap_or(defaults.result_dir),
            cache_dir: get("SPEC_SYNC_CACHE_DIR").map(PathBuf::from).unwrap_or(defaults.cache_dir),
            main_bundle: BundlePattern::new(
                get("SPEC_SYNC_MAIN_BUNDLE_PREFIX").unwrap_or(defaults.main_bundle.prefix),
                get("SPEC_SYNC_MAIN_BUNDLE_SUFFIX").unwrap_or(defaults.main_bundle.suffix),
            ),
            data_bundle: BundlePattern::new(
                get("SPEC_SYNC_DATA_BUNDLE_PREFIX").unwrap_or(defaults.data_bundle.prefix),
                get("SPEC_SYNC_DATA_BUNDLE_SUFFIX").unwrap_or(defaults.data_bundle.suffix),
            ),
            sandbox_timeout: seconds("SPEC_SYNC_SANDBOX_TIMEOUT_SECS", defaults.sandbox_timeout)?,
            sandbox_memory_bytes,
            http_timeout: seconds("SPEC_SYNC_HTTP_TIMEOUT_SECS", defaults.http_timeout)?,
        })
    }
}

fn parse_number(key: &str, raw: &str) -> SyncResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(SyncError::Config(format!("{key} must be greater than zero"))),
        Ok(n) => Ok(n),
        Err(_) => Err(SyncError::Config(format!("{key} is not a number: '{raw}'"))),
    }
}
