/// In-memory snapshot of the domain mapping table
///
/// The table is stored denormalized, the same way it is persisted:
/// - original domain -> comma-separated list of EDS candidates
/// - each EDS domain -> its original domain
use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::is_published_domain;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Mapping {
    entries: BTreeMap<String, String>,
}

/// One configured site as shown in the settings list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingPair {
    pub original: String,
    pub targets: Vec<String>,
}

impl Mapping {
    pub fn new() -> Self {
        Mapping {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, domain: &str) -> Option<&str> {
        self.entries.get(domain).map(String::as_str)
    }

    /// Set a raw entry. Keys are always stored lowercase.
    pub fn insert(&mut self, domain: &str, value: impl Into<String>) {
        self.entries.insert(domain.trim().to_lowercase(), value.into());
    }

    pub fn remove(&mut self, domain: &str) -> bool {
        self.entries.remove(domain).is_some()
    }

    /// Ordered candidate list for a domain: split on commas, trimmed, blanks dropped
    pub fn candidates(&self, domain: &str) -> Vec<&str> {
        self.get(domain)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Point an original domain at its EDS targets (replacing any previous list)
    /// and point every target back at the original.
    pub fn link(&mut self, original: &str, targets: &[String]) {
        let original = original.to_lowercase();
        for target in targets {
            self.insert(target, original.clone());
        }
        self.insert(&original, targets.join(","));
    }

    /// Add a single EDS target to an original domain, keeping existing candidates
    pub fn add_target(&mut self, original: &str, target: &str) {
        let original = original.to_lowercase();
        let target = target.to_lowercase();

        let mut targets: Vec<String> = self
            .candidates(&original)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !targets.contains(&target) {
            targets.push(target.clone());
        }

        self.insert(&target, original.clone());
        self.insert(&original, targets.join(","));
    }

    /// Remove an original domain and every candidate that points back at it.
    /// Returns the removed keys.
    pub fn remove_pair(&mut self, original: &str) -> Vec<String> {
        let original = original.to_lowercase();
        let mut removed = Vec::new();

        let targets: Vec<String> = self
            .candidates(&original)
            .into_iter()
            .map(str::to_string)
            .collect();
        for target in targets {
            if self.get(&target) == Some(original.as_str()) && self.remove(&target) {
                removed.push(target);
            }
        }

        if self.remove(&original) {
            removed.insert(0, original);
        }
        removed
    }

    /// Merge another table into this one; incoming entries win on collision
    pub fn merge(&mut self, other: Mapping) {
        self.entries.extend(other.entries);
    }

    /// Original domains with their EDS targets, one per configured site
    pub fn pairs(&self) -> Vec<MappingPair> {
        self.entries
            .keys()
            .filter(|domain| !is_published_domain(domain))
            .filter_map(|domain| {
                let targets: Vec<String> = self
                    .candidates(domain)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                targets
                    .iter()
                    .any(|t| is_published_domain(t))
                    .then(|| MappingPair {
                        original: domain.clone(),
                        targets,
                    })
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (domain, value) in iter {
            mapping.insert(&domain, value);
        }
        mapping
    }
}
