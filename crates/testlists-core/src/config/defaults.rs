//! Default values for testlists configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Path Defaults
// ============================================================================

/// Root of the e2e source tree.
pub const DEFAULT_SOURCE_TREE: &str = ".";

/// List definition document, relative to the source tree.
pub const DEFAULT_LISTS_FILE: &str = "configurations/testlists.yaml";

/// Directory holding plan documents, relative to the source tree.
pub const DEFAULT_PLANS_DIR: &str = "testplans";

/// Directories scraped for test declarations, relative to the source tree.
///
/// Each test group under `src/tests` is a root of its own, so tests are
/// named after their group.
pub const DEFAULT_SCRAPE_ROOTS: &[&str] = &["src/tests/*"];

/// Project-local config file name.
pub const DEFAULT_CONFIG_FILE: &str = "testlists.toml";

/// Subdirectory of the user config dir.
pub const DEFAULT_USER_CONFIG_DIR: &str = "testlists";

/// Config file name inside the user config dir.
pub const DEFAULT_USER_CONFIG_FILE: &str = "config.toml";

// ============================================================================
// Scraper Defaults
// ============================================================================

/// Source file extensions examined by the scraper.
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &["go"];

/// Subdirectory the scraper descends into when present under a root.
pub const TESTS_SUBDIR: &str = "tests";

/// Final scrape root component standing for every subdirectory of its parent.
pub const SCRAPE_ROOT_WILDCARD: &str = "*";

// ============================================================================
// Resolution Defaults
// ============================================================================

/// Plans that are aggregates and never become profiles on their own.
pub const DEFAULT_RESERVED_PLANS: &[&str] = &["deprecated", "common", "unscheduled", "upgrade"];

/// Entries that open and close a run. Stripped on retrieval.
pub const DEFAULT_BOOKENDS: &[&str] = &[INSTALL_TEST, UNINSTALL_TEST];

/// Name of the install bookend.
pub const INSTALL_TEST: &str = "install";

/// Name of the uninstall bookend.
pub const UNINSTALL_TEST: &str = "uninstall";

/// Name of the synthetic aggregate profile.
pub const ALL_PROFILE: &str = "ALL";

// ============================================================================
// Output Defaults
// ============================================================================

/// Separator between entries in plain output.
pub const DEFAULT_SEPARATOR: &str = " ";
