use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::error::ListError;
use crate::yaml::null_as_default;

/// The list definition document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDefinition {
    /// Explicit profiles. A `null` list is a declared but empty profile.
    #[serde(default, deserialize_with = "null_as_default")]
    pub testprofiles: BTreeMap<String, Option<Vec<String>>>,

    /// Profiles defined as the union of other profiles.
    #[serde(rename = "macro-profiles", default, deserialize_with = "null_as_default")]
    pub macro_profiles: BTreeMap<String, Vec<String>>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ListMetadata,
}

impl ListDefinition {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load the list definition from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ListError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ListError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let yaml = fs::read_to_string(path).map_err(|e| ListError::io(path, e))?;
        Self::from_yaml(&yaml).map_err(|source| ListError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The `metadata` section of a list definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMetadata {
    /// Applied to every profile in order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub groupings: Vec<Grouping>,

    /// Profile names or test names left out of regression runs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub exclude_from_regression: Vec<String>,

    /// Seconds a test took on its last recorded run.
    #[serde(default, deserialize_with = "null_as_default")]
    pub recorded_durations: BTreeMap<String, f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub install_tag_override: InstallTagOverride,
}

/// Tests which need the install step run from a different release tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallTagOverride {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tests: Vec<String>,
}

/// A primary test and the tests that must run right after it, in order.
///
/// Written as a single-key mapping: `- volA: [volB, volC]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct Grouping {
    pub primary: String,
    pub dependents: Vec<String>,
}

impl Grouping {
    pub fn new(primary: impl Into<String>, dependents: Vec<String>) -> Self {
        Self {
            primary: primary.into(),
            dependents,
        }
    }

    /// The single entry that replaces the group: `primary,dep1,dep2`.
    pub fn composite(&self) -> String {
        std::iter::once(&self.primary)
            .chain(&self.dependents)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Replace the primary and its dependents with the composite entry.
    ///
    /// Lists without the primary are left alone.
    pub fn collapse(&self, tests: &mut Vec<String>) {
        if !tests.contains(&self.primary) {
            return;
        }
        let composite = self.composite();
        tests.retain(|t| *t != self.primary && !self.dependents.contains(t) && *t != composite);
        tests.push(composite);
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for Grouping {
    type Error = String;

    fn try_from(map: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "a grouping maps exactly one primary test, found {} keys",
                map.len()
            ));
        }
        let (primary, dependents) = map
            .into_iter()
            .next()
            .ok_or_else(|| "empty grouping".to_string())?;
        Ok(Self::new(primary, dependents))
    }
}

impl From<Grouping> for BTreeMap<String, Vec<String>> {
    fn from(grouping: Grouping) -> Self {
        BTreeMap::from([(grouping.primary, grouping.dependents)])
    }
}
