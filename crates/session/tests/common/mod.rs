#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use ferry::{Session, SessionConfig};
use ferry_remote::MockEndpoint;

pub fn config(root: Option<&str>) -> SessionConfig {
    serde_json::from_value(serde_json::json!({
        "connection": { "host": "deploy.example.com", "username": "deploy" },
        "root": root,
    }))
    .unwrap()
}

/// A session wired to a fresh in-memory endpoint.
pub fn session(root: Option<&str>) -> (Session<MockEndpoint>, MockEndpoint) {
    let endpoint = MockEndpoint::new();
    let session = Session::new(config(root), endpoint.clone());
    (session, endpoint)
}

/// A local source file with the given content, kept alive by the
/// returned tempdir.
pub fn local_file(content: &[u8]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content).unwrap();
    (dir, path)
}
