//! Collaborators supplied by the embedding application
//!
//! The crate does not talk USB/HID itself. An application provides:
//!
//! - a [`ConnectionFactory`] opening a [`VaporyApi`] handle to the device,
//! - a [`RecoveryHandler`] that prompts the user (or otherwise acts) when the
//!   device is in a state an operation cannot proceed from.

use crate::classify::RecoveryAction;
use crate::error::{BoxError, DeviceError};
use crate::signature::{RawSignature, Signature};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

/// Answer of the Vapory application to an address request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressResponse {
    pub public_key: String,
    /// Checksummed address
    pub address: String,
    #[serde(default)]
    pub chain_code: Option<String>,
}

/// Open connection to the Vapory application on the device
#[async_trait]
pub trait VaporyApi: Send {
    async fn get_address(&mut self, path: &str) -> Result<AddressResponse, DeviceError>;

    async fn sign_transaction(
        &mut self,
        path: &str,
        hex_transaction: &str,
    ) -> Result<RawSignature, DeviceError>;
}

/// Command sent to the Vapory application, owned so that it can be replayed
/// after a recovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceRequest {
    GetAddress {
        path: String,
    },
    SignTransaction {
        path: String,
        hex_transaction: String,
    },
}

/// Answer to a [`DeviceRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceResponse {
    Address(AddressResponse),
    Signature(Signature),
}

impl DeviceRequest {
    /// Send the request once over `api`.
    ///
    /// A signature the device returns in a malformed shape is reported as
    /// [`DeviceError::Other`].
    pub async fn send<A>(&self, api: &mut A) -> Result<DeviceResponse, DeviceError>
    where
        A: VaporyApi + ?Sized,
    {
        match self {
            DeviceRequest::GetAddress { path } => {
                debug!("Requesting address for {path}");
                api.get_address(path).await.map(DeviceResponse::Address)
            }
            DeviceRequest::SignTransaction {
                path,
                hex_transaction,
            } => {
                debug!("Requesting signature for {path}");
                let raw = api.sign_transaction(path, hex_transaction).await?;
                Signature::try_from(raw)
                    .map(DeviceResponse::Signature)
                    .map_err(DeviceError::other)
            }
        }
    }
}

/// Produces fresh [`VaporyApi`] handles
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    type Api: VaporyApi;

    async fn connect(&self) -> Result<Self::Api, DeviceError>;
}

/// Callbacks run when the device needs outside help before a retry.
///
/// Each callback completes once the condition is believed to be fixed. An
/// error aborts the operation and is handed to the caller untouched.
#[async_trait]
pub trait RecoveryHandler: Send + Sync {
    async fn connect_device(&self) -> Result<(), BoxError>;

    async fn open_vapory_app(&self) -> Result<(), BoxError>;

    async fn switch_ledger_mode(&self) -> Result<(), BoxError>;

    async fn enable_contract_support(&self) -> Result<(), BoxError>;

    /// Run the callback matching `action`
    async fn recover(&self, action: RecoveryAction) -> Result<(), BoxError> {
        match action {
            RecoveryAction::ConnectDevice => self.connect_device().await,
            RecoveryAction::OpenVaporyApp => self.open_vapory_app().await,
            RecoveryAction::SwitchLedgerMode => self.switch_ledger_mode().await,
            RecoveryAction::EnableContractSupport => self.enable_contract_support().await,
        }
    }
}
