use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::yaml::{null_as_default, scalar_string};

/// A single plan document as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub testcases: BTreeMap<String, Testcase>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: PlanMeta,
}

impl PlanDocument {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// A plan entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<TestcaseFields>")]
pub struct Testcase {
    /// Scraped identifier of the test implementing this entry.
    #[serde(rename = "testcase", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Testcase {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Deserialize)]
struct TestcaseFields {
    #[serde(rename = "testcase", default)]
    reference: Option<String>,

    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

impl From<Option<TestcaseFields>> for Testcase {
    fn from(fields: Option<TestcaseFields>) -> Self {
        fields
            .map(|f| Testcase {
                reference: f.reference,
                extra: f.extra,
            })
            .unwrap_or_default()
    }
}

/// Plan metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMeta {
    /// Plans merged into this one, in order.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    /// Release the upgrade tests in this plan start from.
    #[serde(
        rename = "upgrade-from-version",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub upgrade_from_version: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan() {
        let yaml = r#"
testcases:
  volume_io_ext4:
    testcase: "volume_io.Volume IO should verify ext4"
    owner: storage
  nothing_here:
meta:
  include: [common]
  upgrade-from-version: 2.5
  nightly: true
"#;
        let doc = PlanDocument::from_yaml(yaml).unwrap();
        assert_eq!(
            doc.testcases["volume_io_ext4"].reference.as_deref(),
            Some("volume_io.Volume IO should verify ext4")
        );
        assert!(doc.testcases["volume_io_ext4"].extra.contains_key("owner"));
        assert_eq!(doc.testcases["nothing_here"], Testcase::default());
        assert_eq!(doc.meta.include, vec!["common"]);
        assert_eq!(doc.meta.upgrade_from_version.as_deref(), Some("2.5"));
        assert!(doc.meta.extra.contains_key("nightly"));
    }

    #[test]
    fn test_null_sections() {
        let doc = PlanDocument::from_yaml("testcases:\nmeta:\n").unwrap();
        assert!(doc.testcases.is_empty());
        assert!(doc.meta.include.is_empty());
    }
}
