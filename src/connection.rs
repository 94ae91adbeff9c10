//! Serialized access to the single device connection

use crate::device::{ConnectionFactory, DeviceRequest, DeviceResponse, RecoveryHandler};
use crate::error::{Error, Result};
use crate::retry::{RetryPolicy, deadline_exceeded, recovery_loop};
use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Guards the one connection to the device so that only one operation
/// exchanges commands with it at a time.
///
/// The handle is opened through the factory on first use and kept for later
/// calls. Waiting callers are served in FIFO order.
pub struct LockingConnection<F: ConnectionFactory> {
    factory: F,
    api: Mutex<Option<F::Api>>,
}

impl<F: ConnectionFactory> LockingConnection<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            api: Mutex::new(None),
        }
    }

    /// Send `request` with exclusive use of the device handle, recovering
    /// from known device states under `policy`.
    ///
    /// A call cut short by the policy deadline drops the handle, so the next
    /// caller starts from a freshly opened connection.
    pub async fn send<R>(
        &self,
        recovery: &R,
        policy: &RetryPolicy,
        request: &DeviceRequest,
    ) -> Result<DeviceResponse>
    where
        R: RecoveryHandler + ?Sized,
    {
        let mut slot = self.api.lock().await;
        debug!("Acquired Ledger connection");

        let api = match slot.take() {
            Some(api) => api,
            None => self.open().await?,
        };
        let api = slot.insert(api);

        let attempts = recovery_loop(api, recovery, policy.max_recoveries, request);
        let result = match policy.deadline() {
            Some(deadline) => {
                let outcome = timeout(deadline, attempts).await;
                outcome.unwrap_or_else(|elapsed| {
                    warn!("Discarding Ledger connection interrupted mid-exchange");
                    *slot = None;
                    Err(deadline_exceeded(deadline, elapsed))
                })
            }
            None => attempts.await,
        };

        debug!("Releasing Ledger connection");
        result
    }

    async fn open(&self) -> Result<F::Api> {
        info!("Opening connection to Ledger");
        self.factory
            .connect()
            .await
            .map_err(|e| Error::unknown("Failed to open a connection to the Ledger device", e))
    }
}
