//! The transfer executor: atomic upload and remote delete.
//!
//! Uploads stage content under a temporary remote name and rename it
//! into place. The rename is the single commit point: before it,
//! nothing at the target path has changed; after it, the new content
//! is live. Failures after staging roll the temp file back on a
//! best-effort basis.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use ferry_remote::{ClientFactory, RemoteClient};

use super::Session;
use crate::error::Error;
use crate::remote_path;
use crate::Result;

impl<F: ClientFactory> Session<F> {
    /// Delete `file`, resolved against the configured root, on the
    /// remote side.
    ///
    /// Connects first when necessary. Unless `leave_connection_open`
    /// is set, the connection is torn down afterwards on both the
    /// success and the failure path; a teardown failure is surfaced
    /// only when the delete itself succeeded.
    pub async fn remove(&self, file: &str, leave_connection_open: bool) -> Result<()> {
        let remote = remote_path::resolve(self.inner.config.root.as_deref(), file);

        self.connect().await?;

        debug!(path = %remote, "removing remote file");
        let result = self
            .inner
            .client
            .lock()
            .await
            .delete(&remote)
            .await
            .map_err(|source| Error::Remove {
                path: remote.clone(),
                source,
            });

        if !leave_connection_open {
            let teardown = self.disconnect().await;
            if result.is_ok() {
                teardown?;
            }
        }
        result
    }

    /// Upload `file` to `target_file` (defaulting to `file` itself)
    /// with all-or-nothing visibility.
    ///
    /// While the upload runs it holds the connection open, deferring
    /// any concurrent disconnect. Unless `leave_connection_open` is
    /// set, the connection is torn down afterwards; a teardown
    /// failure is surfaced only when the transfer itself succeeded.
    pub async fn transfer(
        &self,
        file: &Path,
        target_file: Option<&str>,
        leave_connection_open: bool,
    ) -> Result<()> {
        self.begin_transfer();
        let result = self.upload(file, target_file).await;
        self.end_transfer();

        if !leave_connection_open {
            let teardown = self.disconnect().await;
            if result.is_ok() {
                teardown?;
                return Ok(());
            }
        }
        result
    }

    async fn upload(&self, file: &Path, target_file: Option<&str>) -> Result<()> {
        let target = match target_file {
            Some(target) => target.to_string(),
            None => file
                .to_str()
                .ok_or_else(|| Error::InvalidPath(file.display().to_string()))?
                .to_string(),
        };
        let target = remote_path::resolve(self.inner.config.root.as_deref(), &target);
        let tmp = format!("{target}_tmp_{}", unix_millis());
        let dir = remote_path::parent(&tmp);

        self.connect().await?;

        // Exclusive use of the handle for the rest of the pipeline; a
        // concurrent disconnect is already deferred by the transfer
        // flag.
        let mut client = self.inner.client.lock().await;

        client
            .mkdir(&dir, true)
            .await
            .map_err(|source| Error::Mkdir {
                path: dir.clone(),
                source,
            })?;

        match stage_and_commit(
            &mut *client,
            file,
            &target,
            &tmp,
            self.inner.config.connection.use_compression,
        )
        .await
        {
            Ok(()) => Ok(()),
            Err(err) => {
                // Best-effort rollback; the stage error is what the
                // caller sees.
                if let Err(cleanup) = client.delete(&tmp).await {
                    debug!(path = %tmp, error = %cleanup, "temp file cleanup failed");
                }
                Err(err)
            }
        }
    }
}

/// Upload to the temp name, clear the old target, rename into place.
async fn stage_and_commit<C: RemoteClient>(
    client: &mut C,
    file: &Path,
    target: &str,
    tmp: &str,
    use_compression: bool,
) -> Result<()> {
    debug!(local = %file.display(), remote = %tmp, "uploading to temporary path");
    client
        .put(file, tmp, use_compression)
        .await
        .map_err(|source| Error::Put {
            local: file.display().to_string(),
            remote: tmp.to_string(),
            source,
        })?;

    // Clear any previous file at the target; a miss is expected here
    // and ignored.
    if let Err(err) = client.delete(target).await {
        debug!(path = %target, error = %err, "pre-rename delete skipped");
    }

    debug!(from = %tmp, to = %target, "committing");
    client
        .rename(tmp, target)
        .await
        .map_err(|source| Error::Rename {
            from: tmp.to_string(),
            to: target.to_string(),
            source,
        })
}

/// Time-based uniqueness suffix for temporary names.
fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
