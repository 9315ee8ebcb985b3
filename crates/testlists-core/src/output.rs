//! Bookend decoration and rendering of resolved test lists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::config::{DEFAULT_SEPARATOR, INSTALL_TEST, UNINSTALL_TEST};

/// Errors raised while preparing output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Incompatible options: {0}")]
    IncompatibleOptions(String),

    #[error("Unknown output format {0:?}, expected plain, json or yaml")]
    UnknownFormat(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How a list is written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Entries joined by a separator.
    #[default]
    Plain,
    /// A JSON array.
    Json,
    /// A YAML sequence.
    Yaml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(OutputError::UnknownFormat(s.to_string())),
        }
    }
}

/// Options controlling how a profile's list is presented to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Start the run with `install`.
    pub install: bool,
    /// End the run with `uninstall`.
    pub uninstall: bool,
    /// Run every test between its own `install` and `uninstall`.
    pub wrap_each: bool,
    pub separator: String,
    pub format: OutputFormat,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            install: false,
            uninstall: false,
            wrap_each: false,
            separator: DEFAULT_SEPARATOR.to_string(),
            format: OutputFormat::Plain,
        }
    }
}

impl ListOptions {
    pub fn validate(&self) -> Result<(), OutputError> {
        if self.wrap_each && (self.install || self.uninstall) {
            return Err(OutputError::IncompatibleOptions(
                "wrapping each test cannot be combined with a leading install or trailing uninstall"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Add the requested bookends around the tests.
    pub fn decorate(&self, tests: Vec<String>) -> Result<Vec<String>, OutputError> {
        self.validate()?;

        if self.wrap_each {
            return Ok(tests
                .into_iter()
                .flat_map(|t| [INSTALL_TEST.to_string(), t, UNINSTALL_TEST.to_string()])
                .collect());
        }

        let mut decorated = Vec::with_capacity(tests.len() + 2);
        if self.install {
            decorated.push(INSTALL_TEST.to_string());
        }
        decorated.extend(tests);
        if self.uninstall {
            decorated.push(UNINSTALL_TEST.to_string());
        }
        Ok(decorated)
    }

    /// Render tests in the selected format.
    pub fn render(&self, tests: &[String]) -> Result<String, OutputError> {
        match self.format {
            OutputFormat::Plain => Ok(tests.join(&self.separator)),
            OutputFormat::Json => Ok(serde_json::to_string(tests)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(tests)?),
        }
    }
}

/// Write rendered output to a file, replacing its contents.
pub fn write_output(path: &Path, text: &str) -> Result<(), OutputError> {
    fs::write(path, text).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tests() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn test_prepend_and_append() {
        let opts = ListOptions {
            install: true,
            uninstall: true,
            ..ListOptions::default()
        };
        assert_eq!(opts.decorate(tests()).unwrap(), vec!["install", "a", "b", "uninstall"]);
    }

    #[test]
    fn test_wrap_each() {
        let opts = ListOptions {
            wrap_each: true,
            ..ListOptions::default()
        };
        assert_eq!(
            opts.decorate(tests()).unwrap(),
            vec!["install", "a", "uninstall", "install", "b", "uninstall"]
        );
    }

    #[test]
    fn test_wrap_each_with_install_is_rejected() {
        let opts = ListOptions {
            wrap_each: true,
            install: true,
            ..ListOptions::default()
        };
        assert!(matches!(
            opts.decorate(tests()),
            Err(OutputError::IncompatibleOptions(_))
        ));
    }

    #[test]
    fn test_render_formats() {
        let mut opts = ListOptions {
            separator: ",".to_string(),
            ..ListOptions::default()
        };
        assert_eq!(opts.render(&tests()).unwrap(), "a,b");

        opts.format = OutputFormat::Json;
        assert_eq!(opts.render(&tests()).unwrap(), r#"["a","b"]"#);

        opts.format = OutputFormat::Yaml;
        assert_eq!(opts.render(&tests()).unwrap(), "- a\n- b\n");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
