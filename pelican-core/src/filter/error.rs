use crate::filter::FilterId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),

    #[error("Filter {0} not found")]
    NotFound(FilterId),

    #[error("failed to persist snapshot {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {path} is not usable: {reason}")]
    CorruptSnapshot { path: PathBuf, reason: String },
}

impl RegistryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}
