//! Specification Documents
//!
//! The OpenAPI-style document model, the structural predicate that decides
//! whether a recovered value is one, and the stages that work on documents.

pub mod extractor;
pub mod matcher;
pub mod sanitize;

pub use extractor::SpecExtractor;
pub use matcher::{match_documents, MatchOutcome, TitleKey};
pub use sanitize::Sanitizer;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::sandbox::Handle;

/// An API specification document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificationDocument {
    /// Spec version tag, e.g. `3.0.1`
    pub openapi: String,
    #[serde(default)]
    pub info: Info,
    pub paths: Map<String, Value>,
    pub components: Map<String, Value>,
    /// Everything else, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SpecificationDocument {
    pub fn title(&self) -> &str {
        &self.info.title
    }

    pub fn version(&self) -> &str {
        &self.info.version
    }

    /// Pretty JSON with a trailing newline, as stored on disk.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

/// Semantic type a required field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Object,
}

impl FieldKind {
    fn admits(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Object => value.is_object(),
        }
    }
}

/// Fields every specification document carries.
pub const REQUIRED_FIELDS: &[(&str, FieldKind)] = &[
    ("openapi", FieldKind::String),
    ("paths", FieldKind::Object),
    ("components", FieldKind::Object),
];

/// True when `value` is an object with all [`REQUIRED_FIELDS`] of the right
/// kind. Anything else is not a specification document, never a partial one.
pub fn is_specification_shape(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    REQUIRED_FIELDS
        .iter()
        .all(|(field, kind)| object.get(*field).is_some_and(|v| kind.admits(v)))
}

/// A document recovered from the bundle. Identity is the handle.
#[derive(Debug, Clone)]
pub struct DiscoveredDocument {
    pub handle: Handle,
    /// First binding name the object was found under
    pub binding: String,
    pub document: SpecificationDocument,
}

/// A locally tracked specification file. Fixed for the duration of a run.
#[derive(Debug, Clone)]
pub struct ExpectedTarget {
    pub file_name: String,
    pub storage_path: PathBuf,
    pub current: SpecificationDocument,
}

impl ExpectedTarget {
    pub fn title(&self) -> &str {
        self.current.title()
    }
}
