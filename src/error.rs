use anyhow::{anyhow, Result};
use thiserror::Error;

use crate::graph::CommitId;

pub type Attempt = Result<()>;

pub type Maybe<T> = Result<T>;

pub fn fail<T>(message: &str) -> Maybe<T> {
    Err(anyhow!(message.to_string()))
}

/// Failures raised while reading or traversing the commit graph.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphError {
    #[error("Couldn't find {0}")]
    ReferenceNotFound(String),

    #[error("Couldn't find a tag named {0}")]
    TagNotFound(String),

    /// The store referenced a commit it cannot produce.
    #[error("commit {0} is missing from the object store")]
    ObjectNotFound(CommitId),

    #[error("{base} and {other} share no history")]
    NoCommonAncestor { base: String, other: String },

    #[error("depth must be at least 1, got {0}")]
    InvalidDepth(usize),

    #[error("traversal cancelled")]
    Cancelled,

    #[error("git operation failed: {0}")]
    Store(#[from] git2::Error),
}

impl GraphError {
    /// Errors that describe the user's input or a property of the history
    /// rather than a broken repository.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GraphError::ReferenceNotFound(_)
                | GraphError::TagNotFound(_)
                | GraphError::NoCommonAncestor { .. }
        )
    }
}
