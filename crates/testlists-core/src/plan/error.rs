use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading plans.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Plan {name} not found at {}", path.display())]
    NotFound { name: String, path: PathBuf },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid plan document {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Plan include cycle: {}", chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },
}

impl PlanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlanError::Io {
            path: path.into(),
            source,
        }
    }
}
