//! Spec Sync
//!
//! Keeps locally tracked API specification files in step with the documents a
//! documentation site only builds at runtime inside its script bundle:
//! - Bundle discovery by file name pattern (content-hashed assets)
//! - Sandboxed, time-bounded execution of the untrusted bundle (QuickJS)
//! - Title-based reconciliation with duplicate and orphan reporting
//! - Sanitized persistence with a remote changelog per file

pub mod config;
pub mod error;
pub mod sandbox;
pub mod source;
pub mod spec;
pub mod store;
pub mod sync;
pub mod utils;

// Re-exports for convenience
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use sync::{RunReport, SyncPipeline};
