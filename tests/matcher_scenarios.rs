//! Matcher Scenarios
//!
//! Reconciliation of expected targets against discovered documents, including
//! the accounting properties every outcome must satisfy.

use std::collections::HashSet;
use std::path::PathBuf;

use serde_json::json;
use spec_sync::sandbox::Handle;
use spec_sync::spec::matcher::{match_documents, Duplication, MatchOutcome, TitleKey};
use spec_sync::spec::{DiscoveredDocument, ExpectedTarget, SpecificationDocument};

fn document(title: &str, version: &str) -> SpecificationDocument {
    serde_json::from_value(json!({
        "openapi": "3.0.1",
        "info": { "title": title, "version": version },
        "paths": {},
        "components": {}
    }))
    .unwrap()
}

fn expected(titles: &[&str]) -> Vec<ExpectedTarget> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| ExpectedTarget {
            file_name: format!("{i:02}.json"),
            storage_path: PathBuf::from(format!("specs/{i:02}.json")),
            current: document(title, "0.9"),
        })
        .collect()
}

fn discovered(docs: &[(&str, &str)]) -> Vec<DiscoveredDocument> {
    docs.iter()
        .enumerate()
        .map(|(i, (title, version))| DiscoveredDocument {
            handle: Handle(i as u32),
            binding: format!("b{i}"),
            document: document(title, version),
        })
        .collect()
}

/// Every expected target is either matched or unmatched, never both.
fn assert_expected_partition(outcome: &MatchOutcome, expected_len: usize) {
    let matched: HashSet<usize> = outcome.matches.iter().map(|m| m.expected).collect();
    let unmatched: HashSet<usize> = outcome.unmatched_expected.iter().map(|u| u.expected).collect();
    assert!(matched.is_disjoint(&unmatched));
    assert_eq!(matched.len() + unmatched.len(), expected_len);
    assert_eq!(matched.len(), outcome.matches.len());
}

/// Each discovered document is consumed at most once.
fn assert_consumed_once(outcome: &MatchOutcome, discovered_len: usize) {
    let consumed: HashSet<usize> = outcome.matches.iter().map(|m| m.discovered).collect();
    assert_eq!(consumed.len(), outcome.matches.len());
    assert!(consumed.len() <= discovered_len);
}

#[test]
fn test_simple_match() {
    let exp = expected(&["Public API"]);
    let disc = discovered(&[("Public API", "1.0")]);
    let outcome = match_documents(&exp, &disc);

    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].expected, 0);
    assert_eq!(outcome.matches[0].discovered, 0);
    assert!(outcome.unmatched_expected.is_empty());
    assert!(outcome.unmatched_discovered.is_empty());
    assert!(outcome.duplicated_discovered.is_empty());
}

#[test]
fn test_duplicate_discovered_consumes_first() {
    let exp = expected(&["Public API"]);
    let disc = discovered(&[("public api", "1.0"), ("Public API", "1.1")]);
    let outcome = match_documents(&exp, &disc);

    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(disc[outcome.matches[0].discovered].document.version(), "1.0");
    assert!(outcome.unmatched_expected.is_empty());
    // The surplus sits under an expected key: reported as a duplicate only.
    assert!(outcome.unmatched_discovered.is_empty());
    assert_eq!(
        outcome.duplicated_discovered,
        vec![Duplication {
            title: "public api".to_string(),
            count: 2,
            versions: vec!["1.0".to_string(), "1.1".to_string()],
            used_versions: vec!["1.0".to_string()],
        }]
    );
}

#[test]
fn test_unmatched_both_ways() {
    let exp = expected(&["Private API"]);
    let disc = discovered(&[("Public API", "1.0")]);
    let outcome = match_documents(&exp, &disc);

    assert!(outcome.matches.is_empty());
    assert_eq!(outcome.unmatched_expected.len(), 1);
    assert_eq!(outcome.unmatched_expected[0].title, "Private API");
    assert_eq!(outcome.unmatched_expected[0].file_name, "00.json");
    assert_eq!(outcome.unmatched_discovered.len(), 1);
    assert_eq!(outcome.unmatched_discovered[0].title, "Public API");
    assert!(outcome.duplicated_discovered.is_empty());
}

#[test]
fn test_two_targets_share_a_title() {
    let exp = expected(&["Public API", "Trading API", " PUBLIC API "]);
    let disc = discovered(&[
        ("Public API", "2.0"),
        ("Orphan API", "1.0"),
        ("Public API", "2.1"),
        ("Public API", "2.2"),
    ]);
    let outcome = match_documents(&exp, &disc);

    let pairs: Vec<(usize, usize)> = outcome.matches.iter().map(|m| (m.expected, m.discovered)).collect();
    assert_eq!(pairs, vec![(0, 0), (2, 2)]);
    assert_eq!(outcome.unmatched_expected.len(), 1);
    assert_eq!(outcome.unmatched_expected[0].title, "Trading API");
    assert_eq!(outcome.unmatched_discovered.len(), 1);
    assert_eq!(outcome.unmatched_discovered[0].title, "Orphan API");

    let dup = &outcome.duplicated_discovered[0];
    assert_eq!(dup.count, 3);
    assert_eq!(dup.versions, vec!["2.0", "2.1", "2.2"]);
    assert_eq!(dup.used_versions, vec!["2.0", "2.1"]);

    assert_expected_partition(&outcome, exp.len());
    assert_consumed_once(&outcome, disc.len());
}

#[test]
fn test_duplicated_orphans_reported_per_document() {
    let exp = expected(&["Public API"]);
    let disc = discovered(&[("Public API", "1.0"), ("Legacy", "0.1"), ("legacy", "0.2")]);
    let outcome = match_documents(&exp, &disc);

    let orphans: Vec<&str> = outcome.unmatched_discovered.iter().map(|u| u.version.as_str()).collect();
    assert_eq!(orphans, vec!["0.1", "0.2"]);
    assert_eq!(outcome.duplicated_discovered.len(), 1);
    assert_eq!(outcome.duplicated_discovered[0].title, "Legacy");
    assert!(outcome.duplicated_discovered[0].used_versions.is_empty());
}

#[test]
fn test_duplication_count_is_consumed_plus_remaining() {
    let exp = expected(&["A", "A", "B"]);
    let disc = discovered(&[("a", "1"), ("A", "2"), ("a ", "3"), ("B", "4"), ("b", "5")]);
    let outcome = match_documents(&exp, &disc);

    for dup in &outcome.duplicated_discovered {
        let key = TitleKey::new(&dup.title);
        let consumed = outcome
            .matches
            .iter()
            .filter(|m| TitleKey::new(disc[m.discovered].document.title()) == key)
            .count();
        let remaining = disc
            .iter()
            .enumerate()
            .filter(|(i, d)| {
                TitleKey::new(d.document.title()) == key && !outcome.matches.iter().any(|m| m.discovered == *i)
            })
            .count();
        assert_eq!(dup.count, consumed + remaining);
        assert_eq!(dup.used_versions.len(), consumed);
    }
    assert_eq!(outcome.duplicated_discovered.len(), 2);
}

#[test]
fn test_matching_is_deterministic() {
    let exp = expected(&["X", "Y", "x", "Z"]);
    let disc = discovered(&[("Y", "1"), ("x", "2"), ("W", "3"), ("X", "4"), ("w", "5")]);

    let first = match_documents(&exp, &disc);
    for _ in 0..5 {
        assert_eq!(match_documents(&exp, &disc), first);
    }
    assert_expected_partition(&first, exp.len());
    assert_consumed_once(&first, disc.len());
}
