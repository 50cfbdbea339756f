//! Error types for the remote client capability.

use thiserror::Error;

/// Result type alias for remote client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Remote filesystem operation kinds, used for error context and the
/// mock endpoint's operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Connect,
    End,
    Delete,
    Mkdir,
    Put,
    Rename,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OpKind::Connect => "connect",
            OpKind::End => "end",
            OpKind::Delete => "delete",
            OpKind::Mkdir => "mkdir",
            OpKind::Put => "put",
            OpKind::Rename => "rename",
        };
        f.write_str(name)
    }
}

/// Errors reported by a remote client implementation.
///
/// Variants are string-backed and `Clone`: the session layer shares
/// in-flight operation results between concurrent callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The endpoint rejected or dropped the connection attempt.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Graceful close did not complete.
    #[error("close failed: {0}")]
    Close(String),

    /// The remote path does not exist.
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// The server rejected a filesystem operation.
    #[error("{op} failed for {path}: {message}")]
    Op {
        op: OpKind,
        path: String,
        message: String,
    },

    /// A filesystem operation was issued before a successful connect.
    #[error("not connected")]
    NotConnected,
}

impl Error {
    /// Returns true if this error reports a missing remote path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
