//! Spec Matcher
//!
//! Pairs expected targets with discovered documents by normalized title.
//! Titles are not unique on the source site, so discovered documents queue up
//! per title key and are consumed first-discovered-first. The discovered
//! order is taken as given and never re-sorted.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{DiscoveredDocument, ExpectedTarget};

/// Trimmed, case-folded title. Only ever used as a matching key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TitleKey(String);

impl TitleKey {
    pub fn new(title: &str) -> Self {
        Self(normalize_title(title))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Expected target `expected` consumed discovered document `discovered`
/// (indices into the matcher inputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub expected: usize,
    pub discovered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedExpected {
    pub expected: usize,
    pub file_name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedDiscovered {
    pub discovered: usize,
    pub title: String,
    pub version: String,
}

/// Several discovered documents share one title key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplication {
    /// Title as first seen
    pub title: String,
    /// Consumed and remaining documents together
    pub count: usize,
    /// Versions of all documents, in discovery order
    pub versions: Vec<String>,
    /// Versions of the consumed documents, in consumption order
    pub used_versions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// In expected-target order
    pub matches: Vec<Match>,
    pub unmatched_expected: Vec<UnmatchedExpected>,
    pub unmatched_discovered: Vec<UnmatchedDiscovered>,
    pub duplicated_discovered: Vec<Duplication>,
}

struct TitleGroup {
    key: TitleKey,
    first_title: String,
    members: Vec<usize>,
    queue: VecDeque<usize>,
    consumed: Vec<usize>,
}

pub fn match_documents(expected: &[ExpectedTarget], discovered: &[DiscoveredDocument]) -> MatchOutcome {
    // Groups are kept in first-encounter order for deterministic reporting.
    let mut groups: Vec<TitleGroup> = Vec::new();
    let mut group_of: HashMap<TitleKey, usize> = HashMap::new();

    for (idx, doc) in discovered.iter().enumerate() {
        let key = TitleKey::new(doc.document.title());
        let group = *group_of.entry(key.clone()).or_insert_with(|| {
            groups.push(TitleGroup {
                key,
                first_title: doc.document.title().to_string(),
                members: Vec::new(),
                queue: VecDeque::new(),
                consumed: Vec::new(),
            });
            groups.len() - 1
        });
        groups[group].members.push(idx);
        groups[group].queue.push_back(idx);
    }

    let mut outcome = MatchOutcome::default();
    let mut expected_keys: HashSet<TitleKey> = HashSet::new();

    for (idx, target) in expected.iter().enumerate() {
        let key = TitleKey::new(target.title());
        let head = group_of.get(&key).and_then(|&g| {
            let group = &mut groups[g];
            let head = group.queue.pop_front()?;
            group.consumed.push(head);
            Some(head)
        });
        expected_keys.insert(key);

        match head {
            Some(discovered) => outcome.matches.push(Match {
                expected: idx,
                discovered,
            }),
            None => outcome.unmatched_expected.push(UnmatchedExpected {
                expected: idx,
                file_name: target.file_name.clone(),
                title: target.title().to_string(),
            }),
        }
    }

    // Leftovers under an expected key mean "more discovered than expected";
    // the duplication records below cover them.
    for group in groups.iter().filter(|g| !expected_keys.contains(&g.key)) {
        for &idx in &group.queue {
            let document = &discovered[idx].document;
            outcome.unmatched_discovered.push(UnmatchedDiscovered {
                discovered: idx,
                title: document.title().to_string(),
                version: document.version().to_string(),
            });
        }
    }

    let version = |idx: &usize| discovered[*idx].document.version().to_string();
    for group in groups.iter().filter(|g| g.members.len() > 1) {
        outcome.duplicated_discovered.push(Duplication {
            title: group.first_title.clone(),
            count: group.members.len(),
            versions: group.members.iter().map(version).collect(),
            used_versions: group.consumed.iter().map(version).collect(),
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_case_and_whitespace() {
        assert_eq!(normalize_title("Public API"), normalize_title("  public api  "));
        assert_eq!(TitleKey::new("\tÉTAT API\n").as_str(), "état api");
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["Public API", "  MiXeD Case ", "", "ÅPI ", "a  b"] {
            let once = normalize_title(s);
            assert_eq!(normalize_title(&once), once);
        }
    }

    #[test]
    fn test_empty_inputs() {
        let outcome = match_documents(&[], &[]);
        assert_eq!(outcome, MatchOutcome::default());
    }
}
