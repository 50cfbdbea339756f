//! Connect/disconnect lifecycle management.
//!
//! Both directions follow the same shape: decide under the state lock
//! what to do (return, join the in-flight operation, or install a new
//! one), then await outside the lock. The installed operations are
//! `Shared` futures, so every redundant caller polls the same attempt
//! and observes the same outcome.

use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, warn};

use ferry_remote::{ClientFactory, RemoteClient};

use super::{InFlight, Inner, Lifecycle, Session};
use crate::error::Error;
use crate::Result;

enum ConnectStep {
    Done,
    Join(InFlight),
    AfterDisconnect(InFlight),
}

enum DisconnectStep {
    Done,
    Join(InFlight),
    AwaitTransfer,
}

impl<F: ClientFactory> Session<F> {
    /// Establish the connection.
    ///
    /// Idempotent: when already connected this returns immediately,
    /// and a connect already in flight is joined rather than
    /// repeated. A disconnect in flight is awaited first — whatever
    /// its outcome — and the connect decision is then retried from
    /// scratch.
    pub async fn connect(&self) -> Result<()> {
        loop {
            let step = {
                let mut state = self.inner.state.lock();
                match &state.lifecycle {
                    Lifecycle::Connected => ConnectStep::Done,
                    Lifecycle::Connecting(op) => ConnectStep::Join(op.clone()),
                    Lifecycle::Disconnecting(op) => ConnectStep::AfterDisconnect(op.clone()),
                    Lifecycle::Disconnected => {
                        let op = connect_op(Arc::clone(&self.inner)).boxed().shared();
                        state.lifecycle = Lifecycle::Connecting(op.clone());
                        ConnectStep::Join(op)
                    }
                }
            };
            match step {
                ConnectStep::Done => return Ok(()),
                ConnectStep::Join(op) => return op.await,
                ConnectStep::AfterDisconnect(op) => {
                    // Teardown is settling; its outcome does not
                    // matter for the reconnect.
                    let _ = op.await;
                }
            }
        }
    }

    /// Tear down the connection.
    ///
    /// Idempotent, and a teardown already in flight is joined. An
    /// active transfer defers teardown until it releases the
    /// connection. Whatever the teardown outcome, the session ends up
    /// disconnected with a freshly constructed client handle; only
    /// then is a teardown failure surfaced.
    pub async fn disconnect(&self) -> Result<()> {
        loop {
            let step = {
                let mut state = self.inner.state.lock();
                match &state.lifecycle {
                    Lifecycle::Disconnected | Lifecycle::Connecting(_) => DisconnectStep::Done,
                    Lifecycle::Disconnecting(op) => DisconnectStep::Join(op.clone()),
                    Lifecycle::Connected if state.transfer_active => DisconnectStep::AwaitTransfer,
                    Lifecycle::Connected => {
                        let op = disconnect_op(Arc::clone(&self.inner)).boxed().shared();
                        state.lifecycle = Lifecycle::Disconnecting(op.clone());
                        DisconnectStep::Join(op)
                    }
                }
            };
            match step {
                DisconnectStep::Done => return Ok(()),
                DisconnectStep::Join(op) => return op.await,
                DisconnectStep::AwaitTransfer => self.transfer_idle().await,
            }
        }
    }
}

async fn connect_op<F: ClientFactory>(inner: Arc<Inner<F>>) -> Result<()> {
    let mut params = inner.config.connection.clone();
    params.debug = params.debug || inner.config.debug;
    let host = params.host.clone();

    debug!(%host, "connecting");
    let result = inner.client.lock().await.connect(&params).await;

    let mut state = inner.state.lock();
    match result {
        Ok(()) => {
            debug!(%host, "connected");
            state.lifecycle = Lifecycle::Connected;
            Ok(())
        }
        Err(source) => {
            debug!(%host, error = %source, "connect failed");
            state.lifecycle = Lifecycle::Disconnected;
            Err(Error::Connect { host, source })
        }
    }
}

async fn disconnect_op<F: ClientFactory>(inner: Arc<Inner<F>>) -> Result<()> {
    let host = inner.config.connection.host.clone();

    debug!(%host, "disconnecting");
    let result = inner.client.lock().await.end().await;

    // The old handle is never reused, even when teardown failed; a
    // half-closed wire must not leak into the next connect.
    *inner.client.lock().await = inner.factory.create();

    let mut state = inner.state.lock();
    state.lifecycle = Lifecycle::Disconnected;
    drop(state);

    match result {
        Ok(()) => {
            debug!(%host, "disconnected");
            Ok(())
        }
        Err(source) => {
            warn!(%host, error = %source, "disconnect failed, session reset to a fresh handle");
            Err(Error::Disconnect { host, source })
        }
    }
}
