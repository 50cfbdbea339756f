//! In-memory remote endpoint for tests.
//!
//! [`MockEndpoint`] models the remote side of the connection: a flat
//! file table, a directory set, and a scripting surface for failure
//! injection and latency. It implements [`ClientFactory`], handing
//! out numbered [`MockClient`] handles that all talk to the same
//! endpoint state, so tests can assert which handle performed which
//! operation.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::client::{ClientFactory, RemoteClient};
use crate::error::{Error, OpKind, Result};
use crate::params::ConnectParams;

/// One recorded operation attempt. Lifecycle entries carry the id of
/// the handle that performed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Connect { handle: u64 },
    End { handle: u64 },
    Delete { path: String },
    Mkdir { path: String, recursive: bool },
    Put { local: PathBuf, remote: String, compressed: bool },
    Rename { from: String, to: String },
}

#[derive(Default)]
struct EndpointState {
    files: HashMap<String, Vec<u8>>,
    dirs: HashSet<String>,
    ops: Vec<Op>,
    /// One-shot injected failures, consumed in insertion order per kind.
    fail_next: Vec<(OpKind, Error)>,
    latency: Option<Duration>,
    connect_attempts: usize,
    end_calls: usize,
    handles_created: u64,
}

impl EndpointState {
    fn take_failure(&mut self, kind: OpKind) -> Option<Error> {
        let idx = self.fail_next.iter().position(|(k, _)| *k == kind)?;
        Some(self.fail_next.remove(idx).1)
    }
}

/// The shared in-memory endpoint. Cloning yields another view of the
/// same state.
#[derive(Clone, Default)]
pub struct MockEndpoint {
    state: Arc<Mutex<EndpointState>>,
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a file on the remote side, creating its ancestor
    /// directories.
    pub fn seed_file(&self, path: &str, content: &[u8]) {
        let mut state = self.state.lock();
        add_ancestors(&mut state.dirs, path);
        state.files.insert(path.to_string(), content.to_vec());
    }

    /// Fail the next operation of `kind` with `error`.
    pub fn fail_next(&self, kind: OpKind, error: Error) {
        self.state.lock().fail_next.push((kind, error));
    }

    /// Delay every operation by `latency`, giving concurrent callers
    /// a window to interleave.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = Some(latency);
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    /// All remote file paths, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<_> = self.state.lock().files.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn dir_exists(&self, path: &str) -> bool {
        path == "/" || self.state.lock().dirs.contains(path)
    }

    /// The full log of attempted operations, in order.
    pub fn ops(&self) -> Vec<Op> {
        self.state.lock().ops.clone()
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.lock().connect_attempts
    }

    pub fn end_calls(&self) -> usize {
        self.state.lock().end_calls
    }

    /// Number of client handles handed out so far.
    pub fn handles_created(&self) -> u64 {
        self.state.lock().handles_created
    }

    async fn pause(&self) {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl ClientFactory for MockEndpoint {
    type Client = MockClient;

    fn create(&self) -> MockClient {
        let mut state = self.state.lock();
        state.handles_created += 1;
        MockClient {
            id: state.handles_created,
            connected: false,
            endpoint: self.clone(),
        }
    }
}

/// One client handle. Filesystem operations require a successful
/// `connect` on this specific handle first.
pub struct MockClient {
    id: u64,
    connected: bool,
    endpoint: MockEndpoint,
}

impl MockClient {
    pub fn id(&self) -> u64 {
        self.id
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }
}

#[async_trait]
impl RemoteClient for MockClient {
    async fn connect(&mut self, _params: &ConnectParams) -> Result<()> {
        self.endpoint.pause().await;
        let mut state = self.endpoint.state.lock();
        state.connect_attempts += 1;
        state.ops.push(Op::Connect { handle: self.id });
        if let Some(error) = state.take_failure(OpKind::Connect) {
            return Err(error);
        }
        self.connected = true;
        Ok(())
    }

    async fn end(&mut self) -> Result<()> {
        self.endpoint.pause().await;
        let mut state = self.endpoint.state.lock();
        state.end_calls += 1;
        state.ops.push(Op::End { handle: self.id });
        // The wire is gone either way.
        self.connected = false;
        if let Some(error) = state.take_failure(OpKind::End) {
            return Err(error);
        }
        Ok(())
    }

    async fn delete(&mut self, path: &str) -> Result<()> {
        self.endpoint.pause().await;
        self.ensure_connected()?;
        let mut state = self.endpoint.state.lock();
        state.ops.push(Op::Delete {
            path: path.to_string(),
        });
        if let Some(error) = state.take_failure(OpKind::Delete) {
            return Err(error);
        }
        match state.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(path.to_string())),
        }
    }

    async fn mkdir(&mut self, path: &str, recursive: bool) -> Result<()> {
        self.endpoint.pause().await;
        self.ensure_connected()?;
        let mut state = self.endpoint.state.lock();
        state.ops.push(Op::Mkdir {
            path: path.to_string(),
            recursive,
        });
        if let Some(error) = state.take_failure(OpKind::Mkdir) {
            return Err(error);
        }
        if path == "/" {
            return Ok(());
        }
        if recursive {
            add_ancestors(&mut state.dirs, &format!("{path}/"));
            state.dirs.insert(path.to_string());
            return Ok(());
        }
        let parent = parent_dir(path);
        if parent != "/" && !state.dirs.contains(&parent) {
            return Err(Error::Op {
                op: OpKind::Mkdir,
                path: path.to_string(),
                message: format!("no such directory: {parent}"),
            });
        }
        state.dirs.insert(path.to_string());
        Ok(())
    }

    async fn put(&mut self, local: &Path, remote: &str, use_compression: bool) -> Result<()> {
        self.endpoint.pause().await;
        self.ensure_connected()?;
        // Read outside the state lock.
        let content = tokio::fs::read(local).await.map_err(|e| Error::Op {
            op: OpKind::Put,
            path: local.display().to_string(),
            message: e.to_string(),
        })?;
        let mut state = self.endpoint.state.lock();
        state.ops.push(Op::Put {
            local: local.to_path_buf(),
            remote: remote.to_string(),
            compressed: use_compression,
        });
        if let Some(error) = state.take_failure(OpKind::Put) {
            return Err(error);
        }
        let parent = parent_dir(remote);
        if parent != "/" && !state.dirs.contains(&parent) {
            return Err(Error::Op {
                op: OpKind::Put,
                path: remote.to_string(),
                message: format!("no such directory: {parent}"),
            });
        }
        state.files.insert(remote.to_string(), content);
        Ok(())
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.endpoint.pause().await;
        self.ensure_connected()?;
        let mut state = self.endpoint.state.lock();
        state.ops.push(Op::Rename {
            from: from.to_string(),
            to: to.to_string(),
        });
        if let Some(error) = state.take_failure(OpKind::Rename) {
            return Err(error);
        }
        if state.files.contains_key(to) {
            // Plain SFTP rename semantics: the target must not exist.
            return Err(Error::Op {
                op: OpKind::Rename,
                path: to.to_string(),
                message: "target already exists".to_string(),
            });
        }
        match state.files.remove(from) {
            Some(content) => {
                state.files.insert(to.to_string(), content);
                Ok(())
            }
            None => Err(Error::NotFound(from.to_string())),
        }
    }
}

/// Insert every ancestor directory of `path` into `dirs`.
fn add_ancestors(dirs: &mut HashSet<String>, path: &str) {
    let mut end = 0;
    for (idx, ch) in path.char_indices().skip(1) {
        if ch == '/' {
            end = idx;
            dirs.insert(path[..end].to_string());
        }
    }
}

fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}
