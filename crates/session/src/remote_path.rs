//! Remote path resolution.
//!
//! Local-style paths are mapped onto the remote (forward-slash)
//! filesystem regardless of the local platform's conventions: drive
//! letters are stripped, backslashes become separators, and relative
//! segments are resolved lexically. Everything here is pure string
//! manipulation so behavior is identical on every host.

/// Resolve `path` to an absolute remote path under `root`.
pub fn resolve(root: Option<&str>, path: &str) -> String {
    let mut joined = String::new();
    if let Some(root) = root {
        joined.push_str(&to_remote(root));
        joined.push('/');
    }
    joined.push_str(&to_remote(path));
    normalize(&joined)
}

/// Remote dirname; `/` for top-level paths.
pub fn parent(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Convert separators and strip a `C:`-style drive prefix.
fn to_remote(path: &str) -> String {
    let path = path.replace('\\', "/");
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        path[2..].to_string()
    } else {
        path
    }
}

/// Lexically normalize a forward-slash path: collapse `//`, drop `.`
/// segments, resolve `..`, and anchor at `/`.
fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    let mut out = String::from("/");
    out.push_str(&segments.join("/"));
    out
}
