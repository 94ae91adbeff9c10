//! High-level Vapory client API

use crate::classify::UNKNOWN_ERROR_MESSAGE;
use crate::config::Settings;
use crate::connection::LockingConnection;
use crate::device::{ConnectionFactory, DeviceRequest, DeviceResponse, RecoveryHandler};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::signature::Signature;
use crate::types::{Bip32Path, Network, is_hex_payload};
use log::{debug, info};

/// Client for the Vapory application on a Ledger device
pub struct LedgerVapory<F: ConnectionFactory, R: RecoveryHandler> {
    network: Network,
    connection: LockingConnection<F>,
    recovery: R,
    retry_policy: RetryPolicy,
}

impl<F: ConnectionFactory, R: RecoveryHandler> LedgerVapory<F, R> {
    pub fn new(network: Network, factory: F, recovery: R) -> Self {
        Self {
            network,
            connection: LockingConnection::new(factory),
            recovery,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_settings(settings: Settings, factory: F, recovery: R) -> Self {
        Self::new(settings.network, factory, recovery).with_retry_policy(settings.retry)
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Configured network. Derived paths do not depend on it yet.
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Get the address of account `index` (`m/44'/60'/0'/0/{index}`)
    pub async fn get_address_by_bip44_index(&self, index: u32) -> Result<String> {
        let path = Bip32Path::from_bip44_index(index);
        self.get_address_by_bip32_path(path.as_str()).await
    }

    /// Get the checksummed address at derivation path
    pub async fn get_address_by_bip32_path(&self, path: &str) -> Result<String> {
        info!("Getting address for path: {path} on {}", self.network);

        let request = DeviceRequest::GetAddress {
            path: path.to_string(),
        };
        match self.guarded(&request).await? {
            DeviceResponse::Address(response) => Ok(response.address),
            other => Err(unexpected_response(other)),
        }
    }

    /// Sign a hex encoded transaction with account `index`
    pub async fn sign_transaction_by_bip44_index(
        &self,
        hex_transaction: &str,
        index: u32,
    ) -> Result<Signature> {
        let path = Bip32Path::from_bip44_index(index);
        self.sign_transaction_by_bip32_path(hex_transaction, Some(path.as_str()))
            .await
    }

    /// Sign a hex encoded transaction at derivation path.
    ///
    /// `None` signs with account 0. The payload is checked before the path is
    /// resolved or the device is touched.
    pub async fn sign_transaction_by_bip32_path(
        &self,
        hex_transaction: &str,
        path: Option<&str>,
    ) -> Result<Signature> {
        if !is_hex_payload(hex_transaction) {
            return Err(Error::invalid_input(format!(
                "Transaction must be a byte array hex encoded into a string.  Received {hex_transaction}"
            )));
        }

        let path = path.map(Bip32Path::from).unwrap_or_default();
        info!("Signing transaction with path: {path} on {}", self.network);
        debug!("Transaction payload: {hex_transaction}");

        let request = DeviceRequest::SignTransaction {
            path: path.to_string(),
            hex_transaction: hex_transaction.to_string(),
        };
        match self.guarded(&request).await? {
            DeviceResponse::Signature(signature) => Ok(signature),
            other => Err(unexpected_response(other)),
        }
    }

    /// Send `request` on the locked connection, recovering from known device states
    async fn guarded(&self, request: &DeviceRequest) -> Result<DeviceResponse> {
        self.connection
            .send(&self.recovery, &self.retry_policy, request)
            .await
    }
}

fn unexpected_response(response: DeviceResponse) -> Error {
    Error::unknown(
        UNKNOWN_ERROR_MESSAGE,
        format!("Unexpected answer from the Vapory app: {response:?}"),
    )
}
