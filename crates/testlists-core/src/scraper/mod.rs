//! Static scraping of Ginkgo test declarations.
//!
//! Each scrape root holds one directory per test target (or a `tests`
//! directory that does). Source files directly inside a target declare a
//! classname and a set of `Describe`/`It` clauses, which together form the
//! fully qualified test identifiers.

mod error;
mod extractor;
mod patterns;

pub use error::ScrapeError;
pub use extractor::{definition_key, extract_classname, extract_declarations, Declaration};
pub use patterns::Patterns;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{ScraperConfig, SCRAPE_ROOT_WILDCARD, TESTS_SUBDIR};
use crate::diagnostics::{Diagnostic, Diagnostics, SourceLocation};

/// A scraped test declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDefinition {
    /// `{classname}.{suite} {case}`
    pub key: String,
    pub location: SourceLocation,
}

impl TestDefinition {
    pub fn declaring_file(&self) -> &Path {
        &self.location.file
    }
}

/// Directory to classname bindings for one scrape.
#[derive(Debug, Clone, Default)]
pub struct ClassnameTable {
    bindings: BTreeMap<PathBuf, String>,
}

impl ClassnameTable {
    /// Bind `classname` to `dir`. Rebinding to the same name is fine.
    pub fn bind(&mut self, dir: &Path, file: &Path, classname: &str) -> Result<(), ScrapeError> {
        match self.bindings.entry(dir.to_path_buf()) {
            Entry::Vacant(slot) => {
                slot.insert(classname.to_string());
                Ok(())
            }
            Entry::Occupied(slot) if slot.get() == classname => Ok(()),
            Entry::Occupied(slot) => Err(ScrapeError::ClassnameConflict {
                dir: dir.to_path_buf(),
                file: file.to_path_buf(),
                existing: slot.get().clone(),
                found: classname.to_string(),
            }),
        }
    }

    pub fn get(&self, dir: &Path) -> Option<&str> {
        self.bindings.get(dir).map(String::as_str)
    }
}

/// Result of scraping a set of roots.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub definitions: BTreeMap<String, TestDefinition>,
    pub diagnostics: Diagnostics,
}

impl Inventory {
    /// Declaring file of a test identifier.
    pub fn source_of(&self, key: &str) -> Option<&Path> {
        self.definitions.get(key).map(TestDefinition::declaring_file)
    }

    /// Identifier to declaring file view of the definitions.
    pub fn source_map(&self) -> BTreeMap<String, PathBuf> {
        self.definitions
            .iter()
            .map(|(k, d)| (k.clone(), d.location.file.clone()))
            .collect()
    }

    /// Record a declaration. The first definition of a key is kept.
    fn record(&mut self, key: String, location: SourceLocation) {
        match self.definitions.entry(key) {
            Entry::Vacant(slot) => {
                let key = slot.key().clone();
                slot.insert(TestDefinition { key, location });
            }
            Entry::Occupied(slot) => {
                let diagnostic = Diagnostic::DuplicateDefinition {
                    key: slot.key().clone(),
                    first: slot.get().location.clone(),
                    duplicate: location,
                };
                self.diagnostics.push(diagnostic);
            }
        }
    }
}

/// Scrapes test declarations from source trees.
pub struct Scraper {
    patterns: Patterns,
    extensions: Vec<String>,
}

impl Scraper {
    /// Create a scraper with default configuration.
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_config(&ScraperConfig::default())
    }

    /// Create a scraper with custom configuration.
    pub fn with_config(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            patterns: Patterns::compile()?,
            extensions: config.extensions.clone(),
        })
    }

    /// Scrape every root. Missing roots are skipped.
    ///
    /// A root ending in `*` stands for each subdirectory of its parent.
    pub fn scrape(&self, roots: &[PathBuf]) -> Result<Inventory, ScrapeError> {
        let mut inventory = Inventory::default();
        let mut classnames = ClassnameTable::default();

        for root in &expand_roots(roots)? {
            if !root.exists() {
                debug!(root = %root.display(), "scrape root does not exist, skipping");
                continue;
            }
            let root = fs::canonicalize(root).map_err(|e| ScrapeError::io(root, e))?;
            let tests = root.join(TESTS_SUBDIR);
            let base = if tests.is_dir() { tests } else { root };

            for target in list_entries(&base, |p| p.is_dir())? {
                self.scrape_target(&target, &mut classnames, &mut inventory)?;
            }
        }

        debug!(definitions = inventory.definitions.len(), "scrape finished");
        Ok(inventory)
    }

    /// Scrape the source files directly inside one target directory.
    fn scrape_target(
        &self,
        target: &Path,
        classnames: &mut ClassnameTable,
        inventory: &mut Inventory,
    ) -> Result<(), ScrapeError> {
        let files = list_entries(target, |p| p.is_file() && self.is_source(p))?;
        let mut sources = Vec::with_capacity(files.len());
        for file in files {
            let bytes = fs::read(&file).map_err(|e| ScrapeError::io(&file, e))?;
            sources.push((file, String::from_utf8_lossy(&bytes).into_owned()));
        }

        for (file, content) in &sources {
            let Some(classname) = extract_classname(content, &self.patterns) else {
                continue;
            };
            if classname.is_empty() {
                continue;
            }
            let dir = file.parent().unwrap_or(target);
            debug!(dir = %dir.display(), %classname, "classname bound");
            classnames.bind(dir, file, &classname)?;
        }

        for (file, content) in &sources {
            let dir = file.parent().unwrap_or(target);
            let Some(classname) = classnames.get(dir) else {
                continue;
            };
            for declaration in extract_declarations(content, file, classname, &self.patterns) {
                match declaration {
                    Declaration::Test { key, location } => inventory.record(key, location),
                    Declaration::Unresolved { location } => inventory
                        .diagnostics
                        .push(Diagnostic::UnresolvedDeclaration { location }),
                }
            }
        }

        Ok(())
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }
}

/// Replace wildcard roots by the subdirectories they stand for.
fn expand_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>, ScrapeError> {
    let mut expanded = Vec::with_capacity(roots.len());
    for root in roots {
        match (root.file_name(), root.parent()) {
            (Some(name), Some(parent)) if name == SCRAPE_ROOT_WILDCARD => {
                if parent.is_dir() {
                    expanded.extend(list_entries(parent, |p| p.is_dir())?);
                } else {
                    debug!(root = %root.display(), "wildcard parent does not exist, skipping");
                }
            }
            _ => expanded.push(root.clone()),
        }
    }
    Ok(expanded)
}

/// Entries of `dir` accepted by `keep`, sorted by name.
fn list_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>, ScrapeError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ScrapeError::io(dir, e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| keep(p.as_path()))
        .collect();
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classname_rebind_same_name() {
        let mut table = ClassnameTable::default();
        let dir = Path::new("/src/tests/io");
        table.bind(dir, &dir.join("a.go"), "io").unwrap();
        table.bind(dir, &dir.join("b.go"), "io").unwrap();
        assert_eq!(table.get(dir), Some("io"));
    }

    #[test]
    fn test_classname_conflict() {
        let mut table = ClassnameTable::default();
        let dir = Path::new("/src/tests/io");
        table.bind(dir, &dir.join("a.go"), "io").unwrap();
        let err = table.bind(dir, &dir.join("b.go"), "other").unwrap_err();
        assert!(matches!(err, ScrapeError::ClassnameConflict { ref existing, ref found, .. }
            if existing == "io" && found == "other"));
    }

    #[test]
    fn test_wildcard_root_expands_to_subdirectories() {
        let temp = tempfile::TempDir::new().unwrap();
        let tests = temp.path().join("src/tests");
        fs::create_dir_all(tests.join("zfs")).unwrap();
        fs::create_dir_all(tests.join("lvm")).unwrap();
        fs::write(tests.join("README.md"), "groups").unwrap();

        let roots = vec![tests.join(SCRAPE_ROOT_WILDCARD), temp.path().join("other")];
        assert_eq!(
            expand_roots(&roots).unwrap(),
            vec![tests.join("lvm"), tests.join("zfs"), temp.path().join("other")]
        );
        assert!(expand_roots(&[temp.path().join("missing/*")]).unwrap().is_empty());
    }

    #[test]
    fn test_first_definition_kept() {
        let mut inventory = Inventory::default();
        let loc = |file: &str| SourceLocation {
            file: PathBuf::from(file),
            line: 1,
            text: String::new(),
        };
        inventory.record("c.s t".to_string(), loc("first.go"));
        inventory.record("c.s t".to_string(), loc("second.go"));

        assert_eq!(inventory.source_of("c.s t"), Some(Path::new("first.go")));
        assert_eq!(inventory.diagnostics.warning_count(), 1);
    }
}
