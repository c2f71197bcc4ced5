//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{DomainError, Side};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("cannot traverse group '{group}' in {}: {source}", location.display())]
    Traversal {
        location: PathBuf,
        group: String,
        #[source]
        source: std::io::Error,
    },

    #[error("group '{group}' in {} is nested deeper than {max_depth} levels", location.display())]
    TooDeep {
        location: PathBuf,
        group: String,
        max_depth: usize,
    },

    #[error("dataset {path}: cannot read from {side}: {source}")]
    Read {
        path: String,
        side: Side,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    /// Dataset path for dataset-level errors.
    pub fn dataset_path(&self) -> Option<&str> {
        match self {
            ApplicationError::Domain(e) => Some(e.path()),
            ApplicationError::Read { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
