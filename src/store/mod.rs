//! Store Module
//!
//! Local filesystem side of a sync run.

pub mod targets;
pub mod writer;

pub use targets::TargetStore;
pub use writer::{PersistedTarget, ResultWriter, RunManifest};
