//! Content Sanitizer
//!
//! Redacts private-chat invitation links from description texts. Must run
//! before a recovered document is sent to the diff service or written out.

use regex::Regex;
use serde_json::{Map, Value};

use super::SpecificationDocument;

/// Replacement for every redacted link.
pub const REDACTION_TOKEN: &str = "[redacted]";

lazy_static::lazy_static! {
    static ref INVITE_LINK: Regex =
        Regex::new(r"(?i)https?://(?:t|telegram)\.me/(?:joinchat/|\+)[A-Za-z0-9_-]+").unwrap();
}

pub struct Sanitizer {
    patterns: Vec<Regex>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self {
            patterns: vec![INVITE_LINK.clone()],
        }
    }

    /// Redact one text, leaving everything around the links untouched.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for pattern in &self.patterns {
            if pattern.is_match(&out) {
                out = pattern.replace_all(&out, REDACTION_TOKEN).into_owned();
            }
        }
        out
    }

    /// Redact every `description` string in the document. Returns the number
    /// of descriptions changed.
    pub fn sanitize(&self, doc: &mut SpecificationDocument) -> usize {
        let mut changed = 0;

        if let Some(description) = doc.info.description.as_mut() {
            changed += self.replace_in_place(description);
        }
        for map in [
            &mut doc.info.extra,
            &mut doc.paths,
            &mut doc.components,
            &mut doc.extra,
        ] {
            changed += self.walk_map(map);
        }

        changed
    }

    pub fn sanitized(&self, doc: &SpecificationDocument) -> SpecificationDocument {
        let mut copy = doc.clone();
        self.sanitize(&mut copy);
        copy
    }

    fn replace_in_place(&self, text: &mut String) -> usize {
        let redacted = self.redact(text);
        if redacted == *text {
            return 0;
        }
        *text = redacted;
        1
    }

    fn walk_map(&self, map: &mut Map<String, Value>) -> usize {
        let mut changed = 0;
        for (key, value) in map.iter_mut() {
            match value {
                Value::String(text) if key == "description" => changed += self.replace_in_place(text),
                _ => changed += self.walk_value(value),
            }
        }
        changed
    }

    fn walk_value(&self, value: &mut Value) -> usize {
        match value {
            Value::Object(map) => self.walk_map(map),
            Value::Array(items) => items.iter_mut().map(|v| self.walk_value(v)).sum(),
            _ => 0,
        }
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(description: &str) -> SpecificationDocument {
        serde_json::from_value(json!({
            "openapi": "3.0.0",
            "info": { "title": "Public API", "version": "1.0", "description": description },
            "paths": {
                "/orders": { "get": {
                    "description": format!("Support: {description}"),
                    "summary": "https://t.me/joinchat/Summary1"
                } }
            },
            "components": { "schemas": { "Order": { "description": "plain" } } }
        }))
        .unwrap()
    }

    #[test]
    fn test_invite_link_replaced_exactly() {
        let sanitizer = Sanitizer::new();
        assert_eq!(
            sanitizer.redact("Join us at https://t.me/joinchat/AbC123 for news."),
            "Join us at [redacted] for news."
        );
        assert_eq!(sanitizer.redact("no links here"), "no links here");
        assert_eq!(sanitizer.redact("https://t.me/+Xy_9 now"), "[redacted] now");
    }

    #[test]
    fn test_sanitize_walks_all_descriptions() {
        let sanitizer = Sanitizer::new();
        let mut doc = document("Chat: https://t.me/joinchat/AbC123");

        assert_eq!(sanitizer.sanitize(&mut doc), 2);
        assert_eq!(doc.info.description.as_deref(), Some("Chat: [redacted]"));
        let get = &doc.paths["/orders"]["get"];
        assert_eq!(get["description"], "Support: Chat: [redacted]");
        // Only description texts are touched.
        assert_eq!(get["summary"], "https://t.me/joinchat/Summary1");
    }

    #[test]
    fn test_sanitize_twice_is_noop() {
        let sanitizer = Sanitizer::new();
        let once = sanitizer.sanitized(&document("https://t.me/joinchat/AbC123"));
        let mut twice = once.clone();
        assert_eq!(sanitizer.sanitize(&mut twice), 0);
        assert_eq!(once, twice);
    }
}
