//! Loading of test plans.
//!
//! A plan is a YAML document under the plans directory naming a set of
//! testcases. Plans may include other plans; included testcases are merged
//! over the includer's, so on a name collision the included entry wins.

mod document;
mod error;

pub use document::{PlanDocument, PlanMeta, Testcase};
pub use error::PlanError;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

/// Suffixes of synthetic setup/teardown entries that are not tests.
const SUITE_HOOK_SUFFIXES: &[&str] = &["BeforeSuite", "AfterSuite"];

const PLAN_EXTENSION: &str = "yaml";

/// A plan with all of its includes merged in.
#[derive(Debug, Clone, Default)]
pub struct LoadedPlan {
    pub testcases: BTreeMap<String, Testcase>,
    /// The plan's own meta first, then the metas of its includes in order.
    pub metas: Vec<PlanMeta>,
}

impl LoadedPlan {
    /// Every `upgrade-from-version` named by the plan or its includes.
    pub fn upgrade_versions(&self) -> impl Iterator<Item = &str> {
        self.metas
            .iter()
            .filter_map(|m| m.upgrade_from_version.as_deref())
    }
}

/// Reads plan documents from a plans directory.
#[derive(Debug, Clone)]
pub struct PlanLoader {
    plans_dir: PathBuf,
}

impl PlanLoader {
    pub fn new(plans_dir: impl Into<PathBuf>) -> Self {
        Self {
            plans_dir: plans_dir.into(),
        }
    }

    /// Path of the document for `name`.
    pub fn plan_path(&self, name: &str) -> PathBuf {
        self.plans_dir.join(format!("{name}.{PLAN_EXTENSION}"))
    }

    /// Read a single plan document without following includes.
    pub fn read(&self, name: &str) -> Result<PlanDocument, PlanError> {
        let path = self.plan_path(name);
        if !path.is_file() {
            return Err(PlanError::NotFound {
                name: name.to_string(),
                path,
            });
        }

        let yaml = fs::read_to_string(&path).map_err(|e| PlanError::io(&path, e))?;
        PlanDocument::from_yaml(&yaml).map_err(|source| PlanError::Yaml { path, source })
    }

    /// Load a plan and, recursively, everything it includes.
    pub fn load(&self, name: &str) -> Result<LoadedPlan, PlanError> {
        let mut active = Vec::new();
        self.load_recursive(name, &mut active)
    }

    fn load_recursive(&self, name: &str, active: &mut Vec<String>) -> Result<LoadedPlan, PlanError> {
        if active.iter().any(|n| n == name) {
            let mut chain = active.clone();
            chain.push(name.to_string());
            return Err(PlanError::IncludeCycle { chain });
        }

        let doc = self.read(name)?;
        debug!(plan = name, includes = ?doc.meta.include, "plan loaded");

        active.push(name.to_string());
        let includes = doc.meta.include.clone();
        let mut plan = LoadedPlan {
            testcases: doc.testcases,
            metas: vec![doc.meta],
        };
        for include in &includes {
            let included = self.load_recursive(include, active)?;
            plan.testcases.extend(included.testcases);
            plan.metas.extend(included.metas);
        }
        active.pop();

        Ok(plan)
    }

    /// Testcases of a plan, minus the suite setup/teardown hooks.
    pub fn testcases_from_plan(
        &self,
        name: &str,
    ) -> Result<impl Iterator<Item = (String, Testcase)>, PlanError> {
        let plan = self.load(name)?;
        Ok(plan
            .testcases
            .into_iter()
            .filter(|(name, _)| !SUITE_HOOK_SUFFIXES.iter().any(|s| name.ends_with(s))))
    }

    /// Names of every plan in the plans directory, sorted.
    pub fn plan_names(&self) -> Result<Vec<String>, PlanError> {
        let entries = fs::read_dir(&self.plans_dir).map_err(|e| PlanError::io(&self.plans_dir, e))?;

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(PLAN_EXTENSION))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();

        Ok(names)
    }
}
