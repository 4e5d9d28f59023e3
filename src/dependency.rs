use std::fmt::Display;

use linked_hash_map::LinkedHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize)]
pub enum Confidence {
    High,
}

impl Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "High"),
        }
    }
}

/// Why we believe a dependency exists
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[derive(Serialize)]
pub struct Evidence {
    /// Kind of extractor that found it, e.g. `make`
    pub extractor: String,
    /// Where it was found, usually an absolute file path
    pub source: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(Serialize)]
pub struct Dependency {
    pub name: String,
    pub version: Option<String>,
    pub evidence: Vec<Evidence>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
            evidence: Vec::new(),
        }
    }

    pub fn add_evidence(
        &mut self,
        extractor: impl Into<String>,
        source: impl Into<String>,
        confidence: Confidence,
    ) {
        let evidence = Evidence {
            extractor: extractor.into(),
            source: source.into(),
            confidence,
        };
        if !self.evidence.contains(&evidence) {
            self.evidence.push(evidence);
        }
    }

    /// Folds `other`'s evidence (and version, if we have none) into this dependency
    pub fn merge(&mut self, other: Dependency) {
        if self.version.is_none() {
            self.version = other.version;
        }
        for evidence in other.evidence {
            if !self.evidence.contains(&evidence) {
                self.evidence.push(evidence);
            }
        }
    }
}

/// Receives the dependencies found by extractors
pub trait DependencySink {
    fn add_dependency(&mut self, dependency: Dependency);
}

/// Collects dependencies by name, merging repeated submissions
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    dependencies: LinkedHashMap<String, Dependency>,
}

impl DependencySet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.values()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn into_vec(self) -> Vec<Dependency> {
        self.dependencies.into_iter().map(|(_, dependency)| dependency).collect()
    }
}

impl DependencySink for DependencySet {
    fn add_dependency(&mut self, dependency: Dependency) {
        match self.dependencies.get_mut(&dependency.name) {
            Some(existing) => existing.merge(dependency),
            None => {
                self.dependencies.insert(dependency.name.clone(), dependency);
            }
        }
    }
}

impl DependencySink for Vec<Dependency> {
    fn add_dependency(&mut self, dependency: Dependency) {
        self.push(dependency);
    }
}
