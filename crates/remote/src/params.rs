//! Connection parameters for the remote endpoint.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Connection and authentication parameters.
///
/// Field names follow the camelCase task-config convention so a JSON
/// `connection` block deserializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectParams {
    /// Remote host name or address.
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Path to a local private key file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<PathBuf>,
    /// Compression preference honored by `put`.
    #[serde(default)]
    pub use_compression: bool,
    /// When set, implementations should emit wire-level diagnostics
    /// through `tracing`. The session forwards its own debug flag
    /// here before connecting.
    #[serde(default)]
    pub debug: bool,
}

fn default_port() -> u16 {
    22
}
