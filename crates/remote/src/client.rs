//! The client capability traits.

use std::path::Path;

use async_trait::async_trait;

use crate::params::ConnectParams;
use crate::Result;

/// Asynchronous remote filesystem client.
///
/// An implementation owns one wire connection. Methods take
/// `&mut self`: a handle is driven by exactly one operation at a
/// time, and the session layer enforces that discipline through its
/// lifecycle state.
#[async_trait]
pub trait RemoteClient: Send {
    /// Establish the connection.
    async fn connect(&mut self, params: &ConnectParams) -> Result<()>;

    /// Gracefully close the connection.
    async fn end(&mut self) -> Result<()>;

    /// Delete a remote file.
    async fn delete(&mut self, path: &str) -> Result<()>;

    /// Create a remote directory. `recursive` creates missing
    /// ancestors and tolerates an already existing directory.
    async fn mkdir(&mut self, path: &str, recursive: bool) -> Result<()>;

    /// Upload a local file to `remote`.
    async fn put(&mut self, local: &Path, remote: &str, use_compression: bool) -> Result<()>;

    /// Rename `from` to `to`. Assumed atomic on the remote
    /// filesystem; the session uses it as the commit point for
    /// uploads. Fails when `to` already exists.
    async fn rename(&mut self, from: &str, to: &str) -> Result<()>;
}

/// Constructs fresh client handles.
///
/// A session discards its handle after every disconnect attempt,
/// successful or not, and asks the factory for a new one. A failed
/// teardown can therefore never leave a poisoned handle in use.
pub trait ClientFactory: Send + Sync + 'static {
    type Client: RemoteClient + 'static;

    fn create(&self) -> Self::Client;
}
