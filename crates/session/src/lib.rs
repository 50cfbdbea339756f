//! Connection-scoped transfer session with atomic uploads.
//!
//! One [`Session`] owns a single logical connection to a remote
//! file-transfer endpoint (behind the [`RemoteClient`] capability
//! trait) and performs uploads and deletes with transactional
//! semantics on top of a non-atomic remote filesystem:
//!
//! - **Lifecycle manager**: connect/disconnect are serialized through
//!   shared in-flight futures, so redundant concurrent requests join
//!   the attempt already underway instead of starting another one.
//!   After every disconnect attempt, successful or not, the client
//!   handle is discarded and rebuilt from the [`ClientFactory`].
//! - **Transfer executor**: uploads write to a temporary remote name
//!   and rename into place. The rename is the single commit point; a
//!   reader of the target path never observes a partially written
//!   file. A transfer holds the connection open until it completes,
//!   deferring any concurrent disconnect.
//!
//! The wire protocol itself is out of scope: a concrete client
//! implementation is injected through [`ClientFactory`].

pub mod config;
pub mod error;
pub mod logging;
pub mod remote_path;
pub mod session;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use session::Session;

pub use ferry_remote::{ClientFactory, ConnectParams, RemoteClient};
