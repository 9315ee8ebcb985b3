use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a scrape.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Two files in one directory declare different classnames.
    #[error("{} already has classname {existing:?}, {} declares {found:?}", dir.display(), file.display())]
    ClassnameConflict {
        dir: PathBuf,
        file: PathBuf,
        existing: String,
        found: String,
    },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid declaration pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl ScrapeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Io {
            path: path.into(),
            source,
        }
    }
}
