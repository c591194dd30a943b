use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{
    data::{
        datasources::billing_client_datasource::BillingClientDatasource,
        mappers::iap_out_mapper::billing_result_to_result,
        models::billing_client::billing_result_model::BillingResultModel,
    },
    errors::IapError,
};

pub(crate) type ConnectionResult = Result<(), IapError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Ready,
}

struct ConnectionInner {
    state: ConnectionState,
    /// Bumped on every connection attempt and on disconnect, so callbacks
    /// from a torn-down connection can be told apart from current ones.
    generation: u64,
    waiters: Vec<oneshot::Sender<ConnectionResult>>,
}

impl ConnectionInner {
    fn begin_connecting(
        &mut self,
        inner: &Arc<Mutex<ConnectionInner>>,
    ) -> BillingClientStateListener {
        self.state = ConnectionState::Connecting;
        self.generation += 1;
        BillingClientStateListener {
            inner: Arc::clone(inner),
            generation: self.generation,
        }
    }
}

/// Owns the single connection to the billing service and lets any number of
/// callers wait for it to become ready.
pub struct ConnectionStateHandler<B: BillingClientDatasource> {
    billing_client: Arc<B>,
    inner: Arc<Mutex<ConnectionInner>>,
}

impl<B: BillingClientDatasource> ConnectionStateHandler<B> {
    pub(crate) fn new(billing_client: Arc<B>) -> Self {
        Self {
            billing_client,
            inner: Arc::new(Mutex::new(ConnectionInner {
                state: ConnectionState::Disconnected,
                generation: 0,
                waiters: Vec::new(),
            })),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    /// No-op while connecting or ready.
    pub(crate) fn connect(&self) {
        let listener = {
            let mut inner = self.inner.lock();
            if inner.state != ConnectionState::Disconnected {
                return;
            }
            inner.begin_connecting(&self.inner)
        };
        tracing::info!("connecting to billing service");
        self.billing_client.start_connection(listener);
    }

    /// Releases every waiter with `ServiceDisconnected` and ends the
    /// connection if one was started. Idempotent.
    pub(crate) fn disconnect(&self) {
        let (was_connected, waiters) = {
            let mut inner = self.inner.lock();
            let was_connected = inner.state != ConnectionState::Disconnected;
            inner.state = ConnectionState::Disconnected;
            inner.generation += 1;
            (was_connected, std::mem::take(&mut inner.waiters))
        };
        release_waiters(
            waiters,
            Err(IapError::ServiceDisconnected(
                "connection closed by client".to_string(),
            )),
        );
        if was_connected {
            tracing::info!("disconnecting from billing service");
            self.billing_client.end_connection();
        }
    }

    /// Resolves immediately when ready. Otherwise waits for the next
    /// setup-finished or service-disconnected callback and returns its
    /// outcome; a disconnected handler starts connecting first.
    pub(crate) async fn wait_until_ready(&self) -> ConnectionResult {
        let (rx, listener) = {
            let mut inner = self.inner.lock();
            let listener = match inner.state {
                ConnectionState::Ready => return Ok(()),
                ConnectionState::Connecting => None,
                ConnectionState::Disconnected => Some(inner.begin_connecting(&self.inner)),
            };
            let (tx, rx) = oneshot::channel();
            inner.waiters.push(tx);
            (rx, listener)
        };
        if let Some(listener) = listener {
            tracing::info!("connecting to billing service on demand");
            self.billing_client.start_connection(listener);
        }
        rx.await.unwrap_or_else(|_| {
            Err(IapError::ServiceDisconnected(
                "connection handler dropped".to_string(),
            ))
        })
    }

    #[cfg(test)]
    pub(crate) fn waiter_count(&self) -> usize {
        self.inner.lock().waiters.len()
    }
}

/// Callback sink handed to [`BillingClientDatasource::start_connection`].
#[derive(Clone)]
pub struct BillingClientStateListener {
    inner: Arc<Mutex<ConnectionInner>>,
    generation: u64,
}

impl BillingClientStateListener {
    pub fn on_billing_setup_finished(&self, billing_result: BillingResultModel) {
        let result = billing_result_to_result(&billing_result);
        let state = if result.is_ok() {
            ConnectionState::Ready
        } else {
            ConnectionState::Disconnected
        };
        match &result {
            Ok(()) => tracing::info!("billing service connection established"),
            Err(e) => tracing::warn!(
                response_code = billing_result.response_code,
                error = %e,
                "billing service setup failed"
            ),
        }
        self.transition(state, result);
    }

    pub fn on_billing_service_disconnected(&self) {
        tracing::warn!("billing service connection lost");
        self.transition(
            ConnectionState::Disconnected,
            Err(IapError::ServiceDisconnected(
                "billing service disconnected".to_string(),
            )),
        );
    }

    fn transition(&self, state: ConnectionState, result: ConnectionResult) {
        let waiters = {
            let mut inner = self.inner.lock();
            if inner.generation != self.generation {
                tracing::debug!("ignoring callback from a stale connection");
                return;
            }
            inner.state = state;
            std::mem::take(&mut inner.waiters)
        };
        release_waiters(waiters, result);
    }
}

fn release_waiters(waiters: Vec<oneshot::Sender<ConnectionResult>>, result: ConnectionResult) {
    if waiters.is_empty() {
        return;
    }
    tracing::debug!(waiters = waiters.len(), "releasing connection waiters");
    for waiter in waiters {
        // Receiver gone means the caller stopped waiting.
        let _ = waiter.send(result.clone());
    }
}
