// src/dag/targets.rs

//! Target selection and the execution plan derived from it.

use std::collections::HashMap;
use std::fmt;

use regex::RegexSet;

use crate::errors::{Result, WsrunError};
use crate::types::PackageName;

/// Why a package is part of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Matched one of the package filters.
    Primary,
    /// Added as a dependency of a primary package.
    Upstream,
    /// Added as a dependent of a primary package.
    Downstream,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Origin::Primary => "primary",
            Origin::Upstream => "upstream",
            Origin::Downstream => "downstream",
        };
        f.write_str(label)
    }
}

/// OR-combination of package name regexes.
#[derive(Debug, Clone)]
pub struct PackageFilter {
    patterns: Vec<String>,
    set: RegexSet,
}

impl PackageFilter {
    /// Match-everything filter used when no pattern is given.
    pub const MATCH_ALL: &'static str = ".*";

    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns: Vec<String> = if patterns.is_empty() {
            vec![Self::MATCH_ALL.to_string()]
        } else {
            patterns.to_vec()
        };

        // Compile one by one first so the error names the bad pattern.
        for pattern in &patterns {
            if let Err(source) = regex::Regex::new(pattern) {
                return Err(WsrunError::InvalidFilter {
                    pattern: pattern.clone(),
                    source,
                });
            }
        }

        let set = RegexSet::new(&patterns).map_err(|source| WsrunError::InvalidFilter {
            pattern: patterns.join(" | "),
            source,
        })?;

        Ok(Self { patterns, set })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Unanchored search: a pattern matches if it matches anywhere in the name.
    pub fn matches(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    /// Names matching the filter, in input order.
    ///
    /// An empty selection is a [`WsrunError::NoMatch`] listing every candidate.
    pub fn select<'a>(&self, candidates: impl IntoIterator<Item = &'a str>) -> Result<Vec<PackageName>> {
        let candidates: Vec<&str> = candidates.into_iter().collect();
        let selected: Vec<PackageName> = candidates
            .iter()
            .filter(|name| self.matches(name))
            .map(|name| name.to_string())
            .collect();

        if selected.is_empty() {
            return Err(WsrunError::NoMatch {
                filters: self.patterns.clone(),
                candidates: candidates.into_iter().map(str::to_string).collect(),
            });
        }

        Ok(selected)
    }
}

/// Deduplicated union of primary, upstream-added and downstream-added
/// packages.
///
/// First insertion wins: a package already present keeps its origin.
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    members: HashMap<PackageName, Origin>,
    insertion_order: Vec<PackageName>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` with `origin` unless already present. Returns whether it
    /// was added.
    pub fn insert(&mut self, name: PackageName, origin: Origin) -> bool {
        if self.members.contains_key(&name) {
            return false;
        }
        self.members.insert(name.clone(), origin);
        self.insertion_order.push(name);
        true
    }

    pub fn extend(&mut self, names: impl IntoIterator<Item = PackageName>, origin: Origin) {
        for name in names {
            self.insert(name, origin);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn origin_of(&self, name: &str) -> Option<Origin> {
        self.members.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members with the given origin, in insertion order.
    pub fn with_origin(&self, origin: Origin) -> Vec<&str> {
        self.insertion_order
            .iter()
            .filter(|name| self.members.get(*name) == Some(&origin))
            .map(|name| name.as_str())
            .collect()
    }
}

/// A package selected for (or excluded from) execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPackage {
    pub name: PackageName,
    pub origin: Origin,
}

/// Targets in topological order, split by whether they define the script.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub script: String,
    /// Packages to run, in order.
    pub packages: Vec<PlannedPackage>,
    /// Targets without the script; reported, never run.
    pub missing_script: Vec<PlannedPackage>,
}

impl ExecutionPlan {
    /// Restrict `order` to members of `targets` and partition them with
    /// `has_script`. Relative order is preserved on both sides.
    pub fn build(
        order: &[PackageName],
        targets: &TargetSet,
        script: &str,
        mut has_script: impl FnMut(&str) -> bool,
    ) -> Self {
        let mut packages = Vec::new();
        let mut missing_script = Vec::new();

        for name in order {
            let Some(origin) = targets.origin_of(name) else {
                continue;
            };
            let planned = PlannedPackage {
                name: name.clone(),
                origin,
            };
            if has_script(name) {
                packages.push(planned);
            } else {
                missing_script.push(planned);
            }
        }

        Self {
            script: script.to_string(),
            packages,
            missing_script,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn names(&self) -> Vec<PackageName> {
        self.packages.iter().map(|p| p.name.clone()).collect()
    }

    /// Targets lacking the script with the given origin.
    pub fn missing_with_origin(&self, origin: Origin) -> Vec<&str> {
        self.missing_script
            .iter()
            .filter(|p| p.origin == origin)
            .map(|p| p.name.as_str())
            .collect()
    }
}
