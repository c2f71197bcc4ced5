//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::Side;

/// Dataset-level failures. They fail one comparison, never the whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("dataset {path}: shape mismatch: file1 {left:?} vs file2 {right:?}")]
    ShapeMismatch {
        path: String,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    #[error("dataset {path}: unsupported element kind in {file}: {kind}")]
    UnsupportedKind {
        path: String,
        file: Side,
        kind: String,
    },
}

impl DomainError {
    /// Dataset path the error belongs to.
    pub fn path(&self) -> &str {
        match self {
            DomainError::ShapeMismatch { path, .. } => path,
            DomainError::UnsupportedKind { path, .. } => path,
        }
    }
}
