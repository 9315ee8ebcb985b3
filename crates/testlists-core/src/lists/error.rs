use std::path::PathBuf;
use thiserror::Error;

use crate::plan::PlanError;
use crate::scraper::ScrapeError;

/// Errors raised while loading a list definition or resolving profiles.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("List definition not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid list definition {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Plan {plan}: testcase {testcase} has no testcase reference")]
    MissingReference { plan: String, testcase: String },

    #[error("Plan {plan}: testcase {testcase} references {reference:?}, which is not declared in any scraped source")]
    UnresolvedTestcase {
        plan: String,
        testcase: String,
        reference: String,
    },

    #[error("Plan {plan}: cannot derive a test name from {} (testcase {testcase})", file.display())]
    UnnamedTestDirectory {
        plan: String,
        testcase: String,
        file: PathBuf,
    },

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

impl ListError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ListError::Io {
            path: path.into(),
            source,
        }
    }
}
