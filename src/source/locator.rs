//! Bundle Locator
//!
//! Finds the content-hashed script bundles of the documentation site. The
//! file names change on every deploy, so only their prefix and suffix are
//! known in advance.

use regex::Regex;
use reqwest::Url;

use crate::config::BundlePattern;
use crate::error::DiscoveryError;

lazy_static::lazy_static! {
    static ref HEAD_SECTION: Regex = Regex::new(r"(?is)<head\b[^>]*>(.*?)</head\s*>").unwrap();
}

/// Characters allowed between prefix and suffix of a bundle file name.
const HASH_CHARS: &str = r"[A-Za-z0-9_.\-]+?";

pub struct BundleLocator {
    main_pattern: String,
    data_pattern: String,
    main_re: Regex,
    data_re: Regex,
}

impl BundleLocator {
    pub fn new(main: &BundlePattern, data: &BundlePattern) -> Result<Self, regex::Error> {
        let main_re = Regex::new(&format!(
            "{}{}{}",
            regex::escape(&main.prefix),
            HASH_CHARS,
            regex::escape(&main.suffix)
        ))?;

        // The reference may or may not carry a leading separator, but must
        // start a quoted path or follow `./`.
        let data_re = Regex::new(&format!(
            r#"(?:^|["'`(\s.])/?({}{}{})"#,
            regex::escape(data.prefix.trim_start_matches('/')),
            HASH_CHARS,
            regex::escape(&data.suffix)
        ))?;

        Ok(Self {
            main_pattern: main.to_string(),
            data_pattern: data.to_string(),
            main_re,
            data_re,
        })
    }

    /// Path of the main script bundle referenced by the landing page.
    pub fn locate_main_bundle(&self, html: &str) -> Result<String, DiscoveryError> {
        // Fall back to the whole document when the markup has no head section.
        let scope = HEAD_SECTION
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(html);

        self.main_re
            .find(scope)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| DiscoveryError::MainBundleNotFound {
                pattern: self.main_pattern.clone(),
            })
    }

    /// Path of the bundle holding the specification data, always starting
    /// with `/`.
    pub fn locate_data_bundle(&self, bundle_source: &str) -> Result<String, DiscoveryError> {
        self.data_re
            .captures(bundle_source)
            .and_then(|c| c.get(1))
            .map(|m| format!("/{}", m.as_str()))
            .ok_or_else(|| DiscoveryError::DataBundleNotFound {
                pattern: self.data_pattern.clone(),
            })
    }
}

/// Join a located bundle path onto the page it was found from.
pub fn resolve(base: &str, path: &str) -> Result<String, DiscoveryError> {
    let invalid = |reason: String| DiscoveryError::InvalidUrl {
        base: base.to_string(),
        path: path.to_string(),
        reason,
    };

    let base_url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    base_url
        .join(path)
        .map(String::from)
        .map_err(|e| invalid(e.to_string()))
}
