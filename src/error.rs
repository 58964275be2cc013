//! Error Taxonomy
//!
//! One enum per pipeline stage, wrapped by [`SyncError`] at the top level.
//! Nothing in the pipeline recovers locally: every error aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Network read failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("GET {url} returned an empty body")]
    EmptyBody { url: String },

    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// An expected bundle reference is missing from fetched content.
/// Treated as "the site changed", never as a transient problem.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("main bundle reference matching '{pattern}' not found in landing page")]
    MainBundleNotFound { pattern: String },

    #[error("spec bundle reference matching '{pattern}' not found in main bundle")]
    DataBundleNotFound { pattern: String },

    #[error("cannot resolve '{path}' against {base}: {reason}")]
    InvalidUrl {
        base: String,
        path: String,
        reason: String,
    },
}

/// Sandboxed execution or document recovery failed.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("sandbox runtime could not be created: {0}")]
    Runtime(String),

    #[error("bundle script threw: {0}")]
    ScriptFailed(String),

    #[error("bundle script exceeded its {0:?} execution budget")]
    TimedOut(std::time::Duration),

    #[error("no specification documents found among {bindings} top-level bindings")]
    NoDocuments { bindings: usize },

    #[error("binding '{binding}' looks like a specification but cannot be decoded: {source}")]
    Malformed {
        binding: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("sandbox worker aborted: {0}")]
    Aborted(String),
}

/// Remote changelog request failed.
#[derive(Debug, Error)]
pub enum DiffServiceError {
    #[error("diff service returned HTTP {status}: {snippet}")]
    Status { status: u16, snippet: String },

    #[error("diff service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("cannot encode document for the diff service: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Top-level failure of a sync run. Messages carry the URL, file name or
/// HTTP status of the failing stage.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("discovery at {url}: {source}")]
    Discovery {
        url: String,
        #[source]
        source: DiscoveryError,
    },

    #[error("extraction from {url}: {source}")]
    Extraction {
        url: String,
        #[source]
        source: ExtractionError,
    },

    #[error("changelog for {file_name}: {source}")]
    DiffService {
        file_name: String,
        #[source]
        source: DiffServiceError,
    },

    #[error("target {path}: {reason}")]
    Target { path: PathBuf, reason: String },

    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
