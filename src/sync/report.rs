//! Run Report
//!
//! Printed to stdout after a successful run.

use std::fmt;

use crate::spec::matcher::{Duplication, MatchOutcome, UnmatchedDiscovered, UnmatchedExpected};
use crate::spec::{DiscoveredDocument, ExpectedTarget};
use crate::store::RunManifest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLine {
    pub file_name: String,
    /// Title of the discovered document
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub landing_url: String,
    pub main_bundle_url: String,
    pub data_bundle_url: String,
    pub matches: Vec<MatchLine>,
    pub unmatched_expected: Vec<UnmatchedExpected>,
    pub unmatched_discovered: Vec<UnmatchedDiscovered>,
    pub duplicated_discovered: Vec<Duplication>,
}

impl RunReport {
    pub fn new(
        manifest: &RunManifest,
        targets: &[ExpectedTarget],
        discovered: &[DiscoveredDocument],
        outcome: MatchOutcome,
    ) -> Self {
        let matches = outcome
            .matches
            .iter()
            .map(|m| MatchLine {
                file_name: targets[m.expected].file_name.clone(),
                title: discovered[m.discovered].document.title().to_string(),
            })
            .collect();

        Self {
            landing_url: manifest.landing_url.clone(),
            main_bundle_url: manifest.main_bundle_url.clone(),
            data_bundle_url: manifest.data_bundle_url.clone(),
            matches,
            unmatched_expected: outcome.unmatched_expected,
            unmatched_discovered: outcome.unmatched_discovered,
            duplicated_discovered: outcome.duplicated_discovered,
        }
    }
}

fn section<T>(
    f: &mut fmt::Formatter<'_>,
    heading: &str,
    items: &[T],
    line: impl Fn(&T) -> String,
) -> fmt::Result {
    writeln!(f, "{heading}")?;
    if items.is_empty() {
        return writeln!(f, "- none");
    }
    for item in items {
        writeln!(f, "- {}", line(item))?;
    }
    Ok(())
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sources")?;
        writeln!(f, "- landing page: {}", self.landing_url)?;
        writeln!(f, "- main bundle: {}", self.main_bundle_url)?;
        writeln!(f, "- spec bundle: {}", self.data_bundle_url)?;
        writeln!(f)?;

        section(f, "Matches", &self.matches, |m| {
            format!("{} <= \"{}\"", m.file_name, m.title)
        })?;
        writeln!(f)?;
        section(f, "Unmatched expected", &self.unmatched_expected, |u| {
            format!("{} (\"{}\")", u.file_name, u.title)
        })?;
        writeln!(f)?;
        section(f, "Unmatched discovered", &self.unmatched_discovered, |u| {
            format!("\"{}\" ({})", u.title, u.version)
        })?;
        writeln!(f)?;
        section(f, "Duplicated discovered", &self.duplicated_discovered, |d| {
            format!(
                "\"{}\": {} documents, versions [{}], used [{}]",
                d.title,
                d.count,
                d.versions.join(", "),
                d.used_versions.join(", ")
            )
        })
    }
}
