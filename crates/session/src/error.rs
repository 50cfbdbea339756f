//! Error types for session operations.

use ferry_remote::Error as RemoteError;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by session operations.
///
/// Every variant is `Clone`: in-flight connect/disconnect futures are
/// shared between concurrent callers, and each caller observes the
/// same outcome. Best-effort cleanup failures (deleting a stale temp
/// file, clearing the old target before the commit rename) are never
/// represented here; they are logged and swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The underlying connect attempt was rejected; the session
    /// remains disconnected.
    #[error("could not connect to {host}: {source}")]
    Connect { host: String, source: RemoteError },

    /// Teardown failed. The session has still been reset to a fresh
    /// disconnected handle by the time this is returned.
    #[error("could not disconnect from {host}: {source}")]
    Disconnect { host: String, source: RemoteError },

    /// A requested remote delete failed.
    #[error("could not delete {path} on the server: {source}")]
    Remove { path: String, source: RemoteError },

    /// The target directory could not be created.
    #[error("could not create target directory {path} on the server: {source}")]
    Mkdir { path: String, source: RemoteError },

    /// The upload to the temporary remote path failed.
    #[error("could not put {local} to the server at {remote}: {source}")]
    Put {
        local: String,
        remote: String,
        source: RemoteError,
    },

    /// The commit rename failed. The temporary file has already been
    /// cleaned up on a best-effort basis.
    #[error("could not rename {from} to {to} on the server: {source}")]
    Rename {
        from: String,
        to: String,
        source: RemoteError,
    },

    /// A local source path was not valid UTF-8 and no explicit target
    /// was given to derive the remote path from.
    #[error("invalid local path: {0}")]
    InvalidPath(String),
}
