//! Remote filesystem client capability for ferry.
//!
//! This crate defines the seam between the transfer session and the
//! wire protocol. The session only ever talks to a [`RemoteClient`]
//! and constructs handles through a [`ClientFactory`]; a concrete
//! SFTP (or any other) implementation lives outside this workspace.
//!
//! The [`mock`] module (behind the `mock` feature) provides an
//! in-memory endpoint with failure injection and an operation log,
//! used by the session crate's tests.

pub mod client;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod params;

pub use client::{ClientFactory, RemoteClient};
pub use error::{Error, OpKind, Result};
#[cfg(feature = "mock")]
pub use mock::{MockClient, MockEndpoint, Op};
pub use params::ConnectParams;
