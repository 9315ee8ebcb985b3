//! Configuration management for testlists.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. An explicit `--config` file, or project-local `testlists.toml`
//! 3. User config `~/.config/testlists/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

use crate::output::OutputFormat;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Locations of the source tree, plans and list definition.
    pub paths: PathsConfig,

    /// Source scraper configuration.
    pub scraper: ScraperConfig,

    /// Profile resolution configuration.
    pub resolution: ResolutionConfig,

    /// Rendering of resolved lists.
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./testlists.toml` (project local)
    /// 2. `~/.config/testlists/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir
                .join(DEFAULT_USER_CONFIG_DIR)
                .join(DEFAULT_USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("TESTLISTS_SOURCE_TREE") {
            self.paths.source_tree = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("TESTLISTS_LISTS") {
            self.paths.lists = PathBuf::from(file);
        }
        if let Ok(dir) = std::env::var("TESTLISTS_PLANS_DIR") {
            self.paths.plans_dir = PathBuf::from(dir);
        }
        if let Ok(sep) = std::env::var("TESTLISTS_SEPARATOR") {
            self.output.separator = sep;
        }
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scraper.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "scraper.extensions must name at least one extension".to_string(),
            ));
        }
        if self.scraper.extensions.iter().any(|e| e.starts_with('.')) {
            return Err(ConfigError::Invalid(
                "scraper.extensions are given without a leading dot".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Path configuration. Relative paths resolve against `source_tree`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the e2e source tree.
    pub source_tree: PathBuf,

    /// List definition document.
    pub lists: PathBuf,

    /// Directory of plan documents.
    pub plans_dir: PathBuf,

    /// Roots handed to the source scraper.
    pub scrape_roots: Vec<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_tree: PathBuf::from(DEFAULT_SOURCE_TREE),
            lists: PathBuf::from(DEFAULT_LISTS_FILE),
            plans_dir: PathBuf::from(DEFAULT_PLANS_DIR),
            scrape_roots: DEFAULT_SCRAPE_ROOTS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl PathsConfig {
    /// Resolve a configured path against the source tree.
    fn under_tree(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.source_tree.join(path)
        }
    }

    /// Full path of the list definition document.
    pub fn lists_path(&self) -> PathBuf {
        self.under_tree(&self.lists)
    }

    /// Full path of the plans directory.
    pub fn plans_path(&self) -> PathBuf {
        self.under_tree(&self.plans_dir)
    }

    /// Full paths of the scrape roots.
    pub fn scrape_root_paths(&self) -> Vec<PathBuf> {
        self.scrape_roots.iter().map(|p| self.under_tree(p)).collect()
    }
}

/// Source scraper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// File extensions to scan (without leading dot).
    pub extensions: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_SOURCE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Profile resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Plan names never auto-derived into profiles.
    pub reserved_plans: Vec<String>,

    /// Entries removed from a profile on retrieval.
    pub bookends: Vec<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            reserved_plans: DEFAULT_RESERVED_PLANS.iter().map(|s| s.to_string()).collect(),
            bookends: DEFAULT_BOOKENDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Separator for plain output.
    pub separator: String,

    /// Default output format.
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            format: OutputFormat::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.paths.lists, PathBuf::from(DEFAULT_LISTS_FILE));
        assert_eq!(config.scraper.extensions, vec!["go".to_string()]);
        assert_eq!(config.output.separator, DEFAULT_SEPARATOR);
        assert_eq!(config.output.format, OutputFormat::Plain);
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[paths]"));
        assert!(toml_str.contains("[scraper]"));
        assert!(toml_str.contains("[resolution]"));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn test_relative_paths_resolve_against_tree() {
        let paths = PathsConfig {
            source_tree: PathBuf::from("/e2e"),
            ..PathsConfig::default()
        };
        assert_eq!(paths.lists_path(), PathBuf::from("/e2e/configurations/testlists.yaml"));
        assert_eq!(paths.plans_path(), PathBuf::from("/e2e/testplans"));
        assert_eq!(paths.scrape_root_paths(), vec![PathBuf::from("/e2e/src/tests/*")]);
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let paths = PathsConfig {
            source_tree: PathBuf::from("/e2e"),
            lists: PathBuf::from("/elsewhere/lists.yaml"),
            ..PathsConfig::default()
        };
        assert_eq!(paths.lists_path(), PathBuf::from("/elsewhere/lists.yaml"));
    }

    #[test]
    fn test_validate_rejects_dotted_extension() {
        let mut config = Config::default();
        config.scraper.extensions = vec![".go".to_string()];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
