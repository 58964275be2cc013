//! Sandbox Module
//!
//! Runs untrusted bundle code in a disposable, time-bounded context and
//! returns a snapshot of the top-level bindings it introduced. The sandbox
//! has no access to the host: no filesystem, network or process state.

pub mod preprocess;
pub mod quickjs;

pub use preprocess::{prepare_script, PreparedScript};
pub use quickjs::{IsolatedContext, QuickJsSandbox};

use serde_json::Value;
use std::time::Duration;

use crate::error::ExtractionError;

/// Per-run instance tag of an object recovered from the sandbox.
///
/// Two bindings that refer to the same object carry the same handle; two
/// distinct objects never do, even when they are structurally equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u32);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One object-valued top-level binding.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub handle: Handle,
    /// JSON form of the object, `None` when it cannot be serialized.
    pub value: Option<Value>,
}

/// Top-level bindings left behind by a script, in binding order.
#[derive(Debug, Clone, Default)]
pub struct BindingSnapshot {
    pub bindings: Vec<Binding>,
    /// Number of bindings inspected, object-valued or not.
    pub inspected: usize,
}

/// Resource limits of one sandboxed execution
#[derive(Debug, Clone, Copy)]
pub struct SandboxLimits {
    /// Wall-clock budget; the script is aborted when it runs out.
    pub budget: Duration,
    pub memory_bytes: usize,
    pub stack_bytes: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(10),
            memory_bytes: 256 * 1024 * 1024,
            stack_bytes: 1024 * 1024,
        }
    }
}

/// Run code, return a snapshot of its top-level bindings, or fail.
///
/// Every call must evaluate in a freshly created context; bindings of one
/// script never leak into another.
pub trait Sandbox: Send + Sync {
    fn run(&self, script: &PreparedScript) -> Result<BindingSnapshot, ExtractionError>;
}
