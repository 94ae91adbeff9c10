//! Recovery-and-retry loop wrapped around every device call

use crate::classify::{Disposition, classify, terminal_error};
use crate::device::{DeviceRequest, DeviceResponse, RecoveryHandler, VaporyApi};
use crate::error::{Error, Result};
use crate::types::DEFAULT_MAX_RECOVERIES;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::time::error::Elapsed;
use tokio::time::{Duration, timeout};

/// Limits applied to a single device call and its recoveries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Recovery callbacks allowed before giving up; `None` for no limit
    pub max_recoveries: Option<u32>,
    /// Wall-clock budget for the whole call in milliseconds, recoveries included
    pub deadline_ms: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_recoveries: Some(DEFAULT_MAX_RECOVERIES),
            deadline_ms: None,
        }
    }
}

impl RetryPolicy {
    /// Retry for as long as recoveries keep succeeding
    pub fn unbounded() -> Self {
        Self {
            max_recoveries: None,
            deadline_ms: None,
        }
    }

    pub fn with_max_recoveries(mut self, max_recoveries: u32) -> Self {
        self.max_recoveries = Some(max_recoveries);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

/// Send `request` over `api`, recovering from known device states.
///
/// Each failure is classified. Recoverable ones run the matching callback of
/// `recovery` and replay the same request; anything else ends the call with a
/// classified [`Error`]. Attempts are strictly sequential.
///
/// When the policy deadline fires the handle may be left in the middle of an
/// exchange and must not be used again.
pub async fn call_with_recovery<A, R>(
    api: &mut A,
    recovery: &R,
    policy: &RetryPolicy,
    request: &DeviceRequest,
) -> Result<DeviceResponse>
where
    A: VaporyApi + ?Sized,
    R: RecoveryHandler + ?Sized,
{
    let attempts = recovery_loop(api, recovery, policy.max_recoveries, request);

    match policy.deadline() {
        Some(deadline) => timeout(deadline, attempts)
            .await
            .map_err(|elapsed| deadline_exceeded(deadline, elapsed))?,
        None => attempts.await,
    }
}

pub(crate) fn deadline_exceeded(deadline: Duration, elapsed: Elapsed) -> Error {
    warn!("Ledger call exceeded its deadline of {deadline:?}");
    Error::unknown(
        format!("Ledger did not complete the operation within {deadline:?}"),
        elapsed,
    )
}

pub(crate) async fn recovery_loop<A, R>(
    api: &mut A,
    recovery: &R,
    max_recoveries: Option<u32>,
    request: &DeviceRequest,
) -> Result<DeviceResponse>
where
    A: VaporyApi + ?Sized,
    R: RecoveryHandler + ?Sized,
{
    let mut recoveries: u32 = 0;

    loop {
        debug!("Ledger attempt {}", recoveries + 1);
        let error = match request.send(&mut *api).await {
            Ok(response) => return Ok(response),
            Err(error) => error,
        };

        match classify(&error) {
            Disposition::Recover(recovery_action) => {
                if max_recoveries.is_some_and(|max| recoveries >= max) {
                    warn!("Giving up after {recoveries} recoveries, last error: {error}");
                    return Err(Error::unknown(
                        format!("Ledger still failing after {recoveries} recovery attempts"),
                        error,
                    ));
                }

                info!("Ledger reported '{error}', requesting: {recovery_action}");
                recovery
                    .recover(recovery_action)
                    .await
                    .map_err(|source| Error::Recovery {
                        action: recovery_action,
                        source,
                    })?;
                recoveries += 1;
            }
            Disposition::Fail { kind, message } => {
                warn!("Ledger call failed with '{error}' ({kind:?})");
                return Err(terminal_error(kind, message, error));
            }
        }
    }
}
