//! Error types for withrepo.

use std::path::PathBuf;

use crate::filter::FilterError;
use crate::partition::PartitionError;
use crate::walker::WalkError;

/// Top-level error type for withrepo operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("partition error: {0}")]
    Partition(#[from] PartitionError),

    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Map an error to its exit code.
pub fn exit_code(error: &Error) -> i32 {
    match error {
        Error::PathNotFound(_) => 3,
        Error::NotADirectory(_) => 3,
        Error::Io(_) => 1,
        Error::Walk(WalkError::PermissionDenied { .. }) => 4,
        Error::Walk(_) => 2,
        Error::Partition(PartitionError::Walk(WalkError::PermissionDenied { .. })) => 4,
        Error::Partition(_) => 5,
        Error::Filter(_) => 1,
        Error::Serialize(_) => 1,
    }
}
