//! Error types for the lexicon tree storage engine.

use std::io;
use std::path::PathBuf;

use lexicon_common::types::NodeId;
use thiserror::Error;

/// Result type for tree operations.
pub type LexTreeResult<T> = Result<T, LexTreeError>;

/// Errors that can occur in tree operations.
///
/// Absent keys are not errors: `get` on a missing key returns `None` and
/// `remove` on a missing key is a no-op. Only storage-layer failures are
/// exceptional, and none of them are retried internally.
#[derive(Debug, Error)]
pub enum LexTreeError {
    /// A referenced node identity has no persisted representation.
    ///
    /// Unreachable under correct operation; its occurrence indicates
    /// storage corruption or a crash in the middle of a multi-node
    /// structural mutation. No automatic repair is attempted.
    #[error("integrity fault: no persisted node for id {id}")]
    IntegrityFault {
        /// The identity that failed to resolve.
        id: NodeId,
    },

    /// A durable write of a node or the id counter failed.
    ///
    /// Fatal for the in-progress operation: the caller should assume the
    /// persisted tree may now be structurally inconsistent.
    #[error("storage write failed for {path}: {source}")]
    StorageWrite {
        /// The slot that could not be written.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// A persisted slot held bytes that do not decode as a node.
    #[error("corrupted slot: {reason}")]
    Corrupted {
        /// Description of the corruption.
        reason: String,
    },

    /// The in-memory tree shape violates a structural invariant.
    #[error("tree structure error: {0}")]
    Structure(String),

    /// Any other I/O error at the filesystem boundary.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl LexTreeError {
    /// Creates a new integrity fault for the given identity.
    pub fn integrity_fault(id: NodeId) -> Self {
        Self::IntegrityFault { id }
    }

    /// Creates a new storage-write error.
    pub fn storage_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StorageWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new corruption error.
    pub fn corrupted(reason: impl Into<String>) -> Self {
        Self::Corrupted {
            reason: reason.into(),
        }
    }

    /// Creates a new structure error.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    /// Returns true if this is an integrity fault.
    pub fn is_integrity_fault(&self) -> bool {
        matches!(self, Self::IntegrityFault { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LexTreeError::integrity_fault(NodeId::new(42));
        assert_eq!(err.to_string(), "integrity fault: no persisted node for id 42");
        assert!(err.is_integrity_fault());

        let err = LexTreeError::corrupted("bad magic");
        assert!(err.to_string().contains("bad magic"));
        assert!(!err.is_integrity_fault());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: LexTreeError = io_err.into();
        assert!(matches!(err, LexTreeError::Io(_)));
    }

    #[test]
    fn test_storage_write_carries_path() {
        let err = LexTreeError::storage_write(
            "/tmp/tree/7.node",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert!(err.to_string().contains("7.node"));
        assert!(err.to_string().contains("disk full"));
    }
}
