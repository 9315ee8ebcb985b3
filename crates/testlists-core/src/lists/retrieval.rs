use std::collections::BTreeMap;

use super::error::ListError;
use super::resolve::ProfileTable;
use crate::diagnostics::Diagnostics;

/// The outcome of resolving a list definition.
#[derive(Debug, Clone, Default)]
pub struct ResolvedLists {
    /// Finalized profiles, including `ALL`.
    pub profiles: ProfileTable,
    /// Tests left out of regression runs, profile names expanded.
    pub exclude_from_regression: Vec<String>,
    pub recorded_durations: BTreeMap<String, f64>,
    /// Tests whose install step must come from an earlier release.
    pub install_tag_override: Vec<String>,
    /// Entries stripped by [`ResolvedLists::get`].
    pub bookends: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl ResolvedLists {
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Members of a profile as resolved, unsorted and with bookends.
    pub fn members(&self, profile: &str) -> Option<&[String]> {
        self.profiles.get(profile).map(Vec::as_slice)
    }

    /// The ordered test list for a profile.
    ///
    /// Bookends are dropped and the rest sorted by name. With
    /// `sort_by_duration` the longest recorded tests come first; ties and
    /// tests without a recorded duration keep their alphabetical order.
    pub fn get(&self, profile: &str, sort_by_duration: bool) -> Result<Vec<String>, ListError> {
        let members = self
            .members(profile)
            .ok_or_else(|| ListError::ProfileNotFound(profile.to_string()))?;

        let mut tests: Vec<String> = members
            .iter()
            .filter(|t| !self.bookends.contains(t))
            .cloned()
            .collect();
        tests.sort();

        if sort_by_duration {
            tests.sort_by(|a, b| self.duration_of(b).total_cmp(&self.duration_of(a)));
        }

        Ok(tests)
    }

    /// Recorded seconds for a test, 0 when unknown.
    pub fn duration_of(&self, test: &str) -> f64 {
        self.recorded_durations.get(test).copied().unwrap_or(0.0)
    }
}
