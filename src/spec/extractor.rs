//! Spec Extractor
//!
//! Recovers specification documents from the spec bundle: preprocess, run in
//! the sandbox, keep every distinct object that has the document shape.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::{is_specification_shape, DiscoveredDocument};
use crate::error::ExtractionError;
use crate::sandbox::{prepare_script, Sandbox};

pub struct SpecExtractor<S> {
    sandbox: S,
}

impl<S: Sandbox> SpecExtractor<S> {
    pub fn new(sandbox: S) -> Self {
        Self { sandbox }
    }

    /// Every distinct document object in the bundle, in binding order.
    /// Never returns an empty list.
    pub fn extract(&self, bundle_source: &str) -> Result<Vec<DiscoveredDocument>, ExtractionError> {
        let script = prepare_script(bundle_source);
        let snapshot = self.sandbox.run(&script)?;

        let mut seen = HashSet::new();
        let mut documents = Vec::new();

        for binding in snapshot.bindings {
            // Same handle, same object: it was already considered.
            if !seen.insert(binding.handle) {
                debug!("Binding '{}' aliases {}", binding.name, binding.handle);
                continue;
            }

            let Some(value) = binding.value else {
                continue;
            };
            if !is_specification_shape(&value) {
                continue;
            }

            let document = serde_json::from_value(value).map_err(|source| ExtractionError::Malformed {
                binding: binding.name.clone(),
                source,
            })?;
            documents.push(DiscoveredDocument {
                handle: binding.handle,
                binding: binding.name,
                document,
            });
        }

        if documents.is_empty() {
            return Err(ExtractionError::NoDocuments {
                bindings: snapshot.inspected,
            });
        }

        info!(
            "Recovered {} specification documents from {} bindings",
            documents.len(),
            snapshot.inspected
        );
        Ok(documents)
    }
}

impl<S: Sandbox + 'static> SpecExtractor<S> {
    /// Run [`extract`](Self::extract) on the blocking pool; the sandbox is
    /// synchronous and may spin until its budget runs out.
    pub async fn extract_blocking(
        self: Arc<Self>,
        bundle_source: String,
    ) -> Result<Vec<DiscoveredDocument>, ExtractionError> {
        tokio::task::spawn_blocking(move || self.extract(&bundle_source))
            .await
            .map_err(|e| ExtractionError::Aborted(e.to_string()))?
    }
}
