//! Install tags for upgrade runs.
//!
//! Upgrade tests start from an older release: the `install` step must be run
//! with that release's tag, separately from the rest of the tests. The tag is
//! either given explicitly or read from the `upgrade-from-version` entries of
//! the plan being run.

use serde::Serialize;
use thiserror::Error;

use crate::config::INSTALL_TEST;
use crate::plan::LoadedPlan;

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("Upgrade tests need an install tag, but neither an install tag nor a plan was given")]
    NoVersionSource,

    #[error("Plan {plan} names incompatible upgrade-from-versions {first} and {second}")]
    ConflictingVersions {
        plan: String,
        first: String,
        second: String,
    },

    #[error("Cannot run upgrade tests: plan {plan} has no upgrade-from-version")]
    MissingVersion { plan: String },
}

/// A runner invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    /// Release tag to run with, `None` for the default tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub tests: Vec<String>,
}

/// The runner invocations needed for a list of tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPlan {
    /// Install from an earlier release, run before `main`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<Run>,
    pub main: Run,
}

/// Whether any test in the list needs an install from an earlier release.
pub fn requires_install_tag(tests: &[String], overrides: &[String]) -> bool {
    overrides.iter().any(|t| tests.contains(t))
}

/// The single `upgrade-from-version` named by a plan and its includes.
pub fn version_from_plan(plan_name: &str, plan: &LoadedPlan) -> Result<String, UpgradeError> {
    let mut found: Option<&str> = None;
    for version in plan.upgrade_versions() {
        match found {
            Some(first) if first != version => {
                return Err(UpgradeError::ConflictingVersions {
                    plan: plan_name.to_string(),
                    first: first.to_string(),
                    second: version.to_string(),
                });
            }
            _ => found = Some(version),
        }
    }

    found
        .map(str::to_string)
        .ok_or_else(|| UpgradeError::MissingVersion {
            plan: plan_name.to_string(),
        })
}

/// Split a test list into the runs needed to execute it.
///
/// An explicit tag always wins. Without one, upgrade tests take the tag from
/// the plan. When a tag applies and the list contains `install`, the install
/// step becomes a run of its own under that tag.
pub fn plan_runs(
    tests: Vec<String>,
    overrides: &[String],
    explicit_tag: Option<&str>,
    plan: Option<(&str, &LoadedPlan)>,
) -> Result<RunPlan, UpgradeError> {
    let tag = match explicit_tag {
        Some(tag) => Some(tag.to_string()),
        None if requires_install_tag(&tests, overrides) => {
            let (name, plan) = plan.ok_or(UpgradeError::NoVersionSource)?;
            Some(version_from_plan(name, plan)?)
        }
        None => None,
    };

    let install_test = INSTALL_TEST.to_string();
    match tag {
        Some(tag) if tests.contains(&install_test) => Ok(RunPlan {
            install: Some(Run {
                tag: Some(tag),
                tests: vec![install_test.clone()],
            }),
            main: Run {
                tag: None,
                tests: tests.into_iter().filter(|t| *t != install_test).collect(),
            },
        }),
        _ => Ok(RunPlan {
            install: None,
            main: Run { tag: None, tests },
        }),
    }
}
