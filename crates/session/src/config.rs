//! Per-session configuration.

use ferry_remote::ConnectParams;
use serde::{Deserialize, Serialize};

/// Configuration for one transfer session. Immutable for the
/// session's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Connection and authentication parameters for the endpoint.
    pub connection: ConnectParams,
    /// Remote base directory all target paths are resolved under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Emit lifecycle diagnostics and forward the flag to the client
    /// so its wire-level diagnostics land in the same tracing output.
    #[serde(default)]
    pub debug: bool,
}
