//! The connection-scoped transfer session.
//!
//! [`Session`] owns one remote client handle and coordinates three
//! mutually interacting async operations: connecting, disconnecting,
//! and transferring. There is no parallelism inside a session; the
//! lifecycle state plus the transfer flag serialize everything, and
//! the client handle is only ever driven by one operation at a time.

mod lifecycle;
mod transfer;

use std::sync::Arc;

use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, Notify};

use ferry_remote::ClientFactory;

use crate::config::SessionConfig;
use crate::Result;

/// A de-duplicated in-flight lifecycle operation. Concurrent callers
/// clone and await the same future and observe the same outcome.
pub(crate) type InFlight = Shared<BoxFuture<'static, Result<()>>>;

/// Lifecycle of the single logical connection. Exactly one variant
/// holds at any instant; the in-flight variants carry the shared
/// future redundant callers join.
pub(crate) enum Lifecycle {
    Disconnected,
    Connecting(InFlight),
    Connected,
    Disconnecting(InFlight),
}

/// Mutable session state, guarded by a sync mutex that is never held
/// across an await point.
pub(crate) struct State {
    pub(crate) lifecycle: Lifecycle,
    /// A transfer currently holds the connection open; teardown must
    /// wait for it to clear.
    pub(crate) transfer_active: bool,
}

pub(crate) struct Inner<F: ClientFactory> {
    pub(crate) config: SessionConfig,
    pub(crate) factory: F,
    /// The exclusively owned client handle. The lifecycle states keep
    /// it uncontended; the async mutex exists so the `'static`
    /// in-flight futures can reach it.
    pub(crate) client: AsyncMutex<F::Client>,
    pub(crate) state: Mutex<State>,
    /// Signalled whenever a transfer releases the connection.
    pub(crate) transfer_done: Notify,
}

/// The stateful coordinator for one logical connection and its
/// transfers. Cheap to clone; clones share the same connection.
pub struct Session<F: ClientFactory> {
    pub(crate) inner: Arc<Inner<F>>,
}

impl<F: ClientFactory> Clone for Session<F> {
    fn clone(&self) -> Self {
        Session {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: ClientFactory> Session<F> {
    /// Create a session for `config`, constructing the initial client
    /// handle from `factory`.
    pub fn new(config: SessionConfig, factory: F) -> Self {
        let client = AsyncMutex::new(factory.create());
        Session {
            inner: Arc::new(Inner {
                config,
                factory,
                client,
                state: Mutex::new(State {
                    lifecycle: Lifecycle::Disconnected,
                    transfer_active: false,
                }),
                transfer_done: Notify::new(),
            }),
        }
    }

    /// Whether the session currently holds an established connection.
    pub fn is_connected(&self) -> bool {
        matches!(self.inner.state.lock().lifecycle, Lifecycle::Connected)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub(crate) fn begin_transfer(&self) {
        self.inner.state.lock().transfer_active = true;
    }

    pub(crate) fn end_transfer(&self) {
        self.inner.state.lock().transfer_active = false;
        self.inner.transfer_done.notify_waiters();
    }

    /// Wait until no transfer holds the connection open.
    pub(crate) async fn transfer_idle(&self) {
        loop {
            let notified = self.inner.transfer_done.notified();
            tokio::pin!(notified);
            // Register before re-checking so a notify between the
            // check and the await cannot be missed.
            notified.as_mut().enable();
            if !self.inner.state.lock().transfer_active {
                return;
            }
            notified.await;
        }
    }
}
