//! QuickJS Sandbox
//!
//! Embedded QuickJS runtime used to evaluate the spec bundle. Each call gets
//! its own runtime and context, a memory cap, and an interrupt handler that
//! aborts the script once the wall-clock budget is spent.

use rquickjs::{CatchResultExt, Context, Ctx, Function, Runtime, Value};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, warn};

use super::{Binding, BindingSnapshot, Handle, PreparedScript, Sandbox, SandboxLimits};
use crate::error::ExtractionError;

/// Sandbox backed by a fresh QuickJS context per call
#[derive(Debug, Clone, Default)]
pub struct QuickJsSandbox {
    limits: SandboxLimits,
}

impl QuickJsSandbox {
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }
}

impl Sandbox for QuickJsSandbox {
    fn run(&self, script: &PreparedScript) -> Result<BindingSnapshot, ExtractionError> {
        IsolatedContext::new(&self.limits)?.run(script)
    }
}

/// A single-use execution context with an empty global scope.
///
/// `run` consumes the context, so it can never evaluate a second script.
pub struct IsolatedContext {
    context: Context,
    runtime: Runtime,
    limits: SandboxLimits,
}

enum Failure {
    Setup(String),
    Threw(String),
}

impl IsolatedContext {
    pub fn new(limits: &SandboxLimits) -> Result<Self, ExtractionError> {
        let runtime = Runtime::new().map_err(|e| ExtractionError::Runtime(e.to_string()))?;
        runtime.set_memory_limit(limits.memory_bytes);
        runtime.set_max_stack_size(limits.stack_bytes);

        let context = Context::full(&runtime).map_err(|e| ExtractionError::Runtime(e.to_string()))?;

        Ok(Self {
            context,
            runtime,
            limits: *limits,
        })
    }

    pub fn run(self, script: &PreparedScript) -> Result<BindingSnapshot, ExtractionError> {
        let budget = self.limits.budget;
        let deadline = Instant::now() + budget;
        self.runtime
            .set_interrupt_handler(Some(Box::new(move || Instant::now() >= deadline)));

        let started = Instant::now();
        let result = self.context.with(|ctx| take_snapshot(&ctx, script));
        debug!("Bundle evaluated in {:?}", started.elapsed());

        // Anything that ran past the deadline is a timeout, whatever error the
        // interrupt surfaced as.
        if Instant::now() >= deadline {
            warn!("Bundle script exceeded its {:?} budget", budget);
            return Err(ExtractionError::TimedOut(budget));
        }

        result.map_err(|failure| match failure {
            Failure::Setup(msg) => ExtractionError::Runtime(msg),
            Failure::Threw(msg) => ExtractionError::ScriptFailed(msg),
        })
    }
}

fn take_snapshot<'js>(ctx: &Ctx<'js>, script: &PreparedScript) -> Result<BindingSnapshot, Failure> {
    let setup = |e: rquickjs::Error| Failure::Setup(e.to_string());

    // Captured before the untrusted code runs, so the script cannot replace them.
    let own_names: Function = ctx.eval("Object.getOwnPropertyNames").map_err(setup)?;
    let stringify: Function = ctx.eval("JSON.stringify").map_err(setup)?;
    let globals = ctx.globals();

    let pristine: HashSet<String> = own_names
        .call::<_, Vec<String>>((globals.clone(),))
        .map_err(setup)?
        .into_iter()
        .collect();

    ctx.eval::<(), _>(script.source.as_str())
        .catch(ctx)
        .map_err(|e| Failure::Threw(e.to_string()))?;

    // Global object properties, non-enumerable ones included.
    let mut entries: Vec<(String, Value<'js>)> = Vec::new();
    let names = own_names
        .call::<_, Vec<String>>((globals.clone(),))
        .map_err(setup)?;
    for name in names.into_iter().filter(|n| !pristine.contains(n)) {
        match globals.get::<_, Value>(name.as_str()).catch(ctx) {
            Ok(value) => entries.push((name, value)),
            Err(e) => debug!("Skipping global '{}': {}", name, e),
        }
    }

    // Global lexical bindings resolve by name but are not properties.
    for name in &script.lexical_names {
        if entries.iter().any(|(n, _)| n == name) {
            continue;
        }
        if let Ok(value) = ctx.eval::<Value, _>(name.as_str()).catch(ctx) {
            entries.push((name.clone(), value));
        }
    }

    let inspected = entries.len();
    let mut seen: Vec<(Value<'js>, Handle, Option<serde_json::Value>)> = Vec::new();
    let mut bindings = Vec::new();

    for (name, value) in entries {
        if value.as_object().is_none() || value.is_function() {
            continue;
        }

        // Reference identity: the same object under two names shares a handle.
        if let Some((_, handle, json)) = seen.iter().find(|(v, _, _)| *v == value) {
            bindings.push(Binding {
                name,
                handle: *handle,
                value: json.clone(),
            });
            continue;
        }

        let handle = Handle(seen.len() as u32);
        let json = match stringify.call::<_, Option<String>>((value.clone(),)).catch(ctx) {
            Ok(Some(text)) => serde_json::from_str(&text).ok(),
            Ok(None) => None,
            Err(e) => {
                debug!("Binding '{}' is not serializable: {}", name, e);
                None
            }
        };

        seen.push((value, handle, json.clone()));
        bindings.push(Binding {
            name,
            handle,
            value: json,
        });
    }

    Ok(BindingSnapshot {
        bindings,
        inspected,
    })
}
