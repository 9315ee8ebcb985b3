//! Profile resolution.
//!
//! Resolution runs as a sequence of passes, each taking the profile table
//! produced by the previous one:
//!
//! 1. derive profiles from plans that have no explicit definition
//! 2. materialize macro profiles as unions
//! 3. collapse groupings into composite entries
//! 4. expand profile names in the regression exclusion list
//! 5. add the `ALL` aggregate

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::definition::{Grouping, ListDefinition};
use super::error::ListError;
use super::retrieval::ResolvedLists;
use crate::config::{Config, ALL_PROFILE, DEFAULT_BOOKENDS, DEFAULT_RESERVED_PLANS};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::plan::PlanLoader;
use crate::scraper::{Inventory, Scraper};

/// Profile name to member list.
pub type ProfileTable = BTreeMap<String, Vec<String>>;

/// Resolves list definitions against a source tree.
pub struct Resolver {
    plans: PlanLoader,
    scraper: Scraper,
    scrape_roots: Vec<PathBuf>,
    reserved_plans: Vec<String>,
    bookends: Vec<String>,
}

impl Resolver {
    /// Create a resolver with the default reserved plans and bookends.
    pub fn new(plans: PlanLoader, scraper: Scraper, scrape_roots: Vec<PathBuf>) -> Self {
        Self {
            plans,
            scraper,
            scrape_roots,
            reserved_plans: DEFAULT_RESERVED_PLANS.iter().map(|s| s.to_string()).collect(),
            bookends: DEFAULT_BOOKENDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ListError> {
        let resolver = Self::new(
            PlanLoader::new(config.paths.plans_path()),
            Scraper::with_config(&config.scraper)?,
            config.paths.scrape_root_paths(),
        );
        Ok(resolver
            .reserved_plans(config.resolution.reserved_plans.clone())
            .bookends(config.resolution.bookends.clone()))
    }

    /// Sets the plans that are never derived into profiles.
    pub fn reserved_plans(mut self, plans: Vec<String>) -> Self {
        self.reserved_plans = plans;
        self
    }

    /// Sets the entries stripped on retrieval.
    pub fn bookends(mut self, bookends: Vec<String>) -> Self {
        self.bookends = bookends;
        self
    }

    /// Run every pass over a list definition.
    pub fn resolve(&self, definition: ListDefinition) -> Result<ResolvedLists, ListError> {
        let ListDefinition {
            testprofiles,
            macro_profiles,
            metadata,
        } = definition;
        let mut diagnostics = Diagnostics::new();

        let profiles = self.derive_plan_profiles(testprofiles, &mut diagnostics)?;
        let profiles = apply_macro_profiles(profiles, &macro_profiles, &mut diagnostics);
        let profiles = collapse_groupings(profiles, &metadata.groupings);
        let exclude_from_regression = expand_exclusions(&profiles, &metadata.exclude_from_regression);
        let profiles = with_all_profile(profiles);

        debug!(profiles = profiles.len(), "profiles resolved");
        Ok(ResolvedLists {
            profiles,
            exclude_from_regression,
            recorded_durations: metadata.recorded_durations,
            install_tag_override: metadata.install_tag_override.tests,
            bookends: self.bookends.clone(),
            diagnostics,
        })
    }

    /// Add a profile for every plan that has no explicit definition.
    ///
    /// The source tree is scraped at most once, and only when some plan
    /// actually needs deriving.
    pub fn derive_plan_profiles(
        &self,
        explicit: BTreeMap<String, Option<Vec<String>>>,
        diagnostics: &mut Diagnostics,
    ) -> Result<ProfileTable, ListError> {
        let mut profiles: ProfileTable = explicit
            .into_iter()
            .map(|(name, tests)| (name, without_repeats(tests.unwrap_or_default())))
            .collect();

        let mut pending = Vec::new();
        for plan in self.plans.plan_names()? {
            if self.reserved_plans.contains(&plan) {
                continue;
            }
            if profiles.contains_key(&plan) {
                diagnostics.push(Diagnostic::ExplicitProfileShadowsPlan { profile: plan });
                continue;
            }
            pending.push(plan);
        }
        if pending.is_empty() {
            return Ok(profiles);
        }

        let inventory = self.scraper.scrape(&self.scrape_roots)?;
        diagnostics.extend(inventory.diagnostics.iter().cloned());

        for plan in pending {
            let tests = derive_profile(&self.plans, &plan, &inventory)?;
            info!(plan = %plan, tests = tests.len(), "profile derived from plan");
            profiles.insert(plan, tests);
        }

        Ok(profiles)
    }
}

/// Tests needed to run a plan's testcases.
///
/// Each testcase reference is looked up among the scraped declarations; the
/// test is named after the directory two levels above the declaring file.
pub fn derive_profile(
    plans: &PlanLoader,
    plan: &str,
    inventory: &Inventory,
) -> Result<Vec<String>, ListError> {
    let mut tests = BTreeSet::new();

    for (testcase, entry) in plans.testcases_from_plan(plan)? {
        let Some(reference) = entry.reference else {
            return Err(ListError::MissingReference {
                plan: plan.to_string(),
                testcase,
            });
        };
        let Some(file) = inventory.source_of(&reference) else {
            return Err(ListError::UnresolvedTestcase {
                plan: plan.to_string(),
                testcase,
                reference,
            });
        };
        let Some(name) = test_name_for(file) else {
            return Err(ListError::UnnamedTestDirectory {
                plan: plan.to_string(),
                testcase,
                file: file.to_path_buf(),
            });
        };
        tests.insert(name);
    }

    Ok(tests.into_iter().collect())
}

/// Name of the grandparent directory of a declaring file.
fn test_name_for(file: &Path) -> Option<String> {
    file.parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// Sorted union of the members of `names`. Unknown names contribute nothing.
pub fn union_of<S: AsRef<str>>(profiles: &ProfileTable, names: &[S]) -> Vec<String> {
    names
        .iter()
        .filter_map(|name| profiles.get(name.as_ref()))
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Materialize each macro profile as the union of its constituents.
///
/// Constituents are looked up in the table as it was before this pass, so a
/// macro cannot be built from another macro.
pub fn apply_macro_profiles(
    profiles: ProfileTable,
    macros: &BTreeMap<String, Vec<String>>,
    diagnostics: &mut Diagnostics,
) -> ProfileTable {
    let unions: Vec<(String, Vec<String>)> = macros
        .iter()
        .map(|(name, members)| (name.clone(), union_of(&profiles, members)))
        .collect();

    let mut profiles = profiles;
    for (name, tests) in unions {
        if profiles.contains_key(&name) {
            diagnostics.push(Diagnostic::MacroShadowsProfile {
                profile: name.clone(),
            });
        }
        profiles.insert(name, tests);
    }
    profiles
}

/// Apply every grouping, in order, to every profile.
pub fn collapse_groupings(mut profiles: ProfileTable, groupings: &[Grouping]) -> ProfileTable {
    for grouping in groupings {
        for tests in profiles.values_mut() {
            grouping.collapse(tests);
        }
    }
    profiles
}

/// Replace profile names in an exclusion list by their members.
///
/// Other entries are kept as test names. The result has no repeats.
pub fn expand_exclusions(profiles: &ProfileTable, excludes: &[String]) -> Vec<String> {
    without_repeats(excludes.iter().flat_map(|entry| match profiles.get(entry) {
        Some(tests) => tests.clone(),
        None => vec![entry.clone()],
    }))
}

/// Drop repeated entries, keeping the first occurrence of each.
pub fn without_repeats(tests: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    tests
        .into_iter()
        .filter(|test| seen.insert(test.clone()))
        .collect()
}

/// Add the `ALL` profile: the union of every other profile.
pub fn with_all_profile(mut profiles: ProfileTable) -> ProfileTable {
    let names: Vec<&String> = profiles.keys().filter(|name| *name != ALL_PROFILE).collect();
    let all = union_of(&profiles, &names);
    profiles.insert(ALL_PROFILE.to_string(), all);
    profiles
}
