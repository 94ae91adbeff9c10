//! Rust client for the Vapory application on Ledger hardware wallets
//!
//! This crate derives addresses and signs raw transactions through a Ledger
//! device while recovering from the device states users routinely run into:
//! the device is unplugged, another app is open, the transport is in the
//! wrong mode, or contract data is disabled. For each of those the client
//! calls back into the application (typically to prompt the user) and then
//! retries the operation.
//!
//! All device access goes through a single connection guarded by a lock, so
//! concurrent callers queue instead of interleaving commands on the wire.
//!
//! The application supplies the transport through [`ConnectionFactory`] and
//! [`VaporyApi`], and the prompts through [`RecoveryHandler`].
//!
//! # Examples
//!
//! ```no_run
//! use ledger_vapory::{LedgerVapory, Network};
//! # use async_trait::async_trait;
//! # use ledger_vapory::{
//! #     AddressResponse, BoxError, ConnectionFactory, DeviceError, RawSignature,
//! #     RecoveryHandler, VaporyApi,
//! # };
//! #
//! # struct HidApi;
//! #
//! # #[async_trait]
//! # impl VaporyApi for HidApi {
//! #     async fn get_address(&mut self, _: &str) -> Result<AddressResponse, DeviceError> {
//! #         Err(DeviceError::NoDeviceFound)
//! #     }
//! #     async fn sign_transaction(
//! #         &mut self,
//! #         _: &str,
//! #         _: &str,
//! #     ) -> Result<RawSignature, DeviceError> {
//! #         Err(DeviceError::NoDeviceFound)
//! #     }
//! # }
//! #
//! # struct HidFactory;
//! #
//! # #[async_trait]
//! # impl ConnectionFactory for HidFactory {
//! #     type Api = HidApi;
//! #     async fn connect(&self) -> Result<HidApi, DeviceError> {
//! #         Ok(HidApi)
//! #     }
//! # }
//! #
//! # struct Prompts;
//! #
//! # #[async_trait]
//! # impl RecoveryHandler for Prompts {
//! #     async fn connect_device(&self) -> Result<(), BoxError> { Ok(()) }
//! #     async fn open_vapory_app(&self) -> Result<(), BoxError> { Ok(()) }
//! #     async fn switch_ledger_mode(&self) -> Result<(), BoxError> { Ok(()) }
//! #     async fn enable_contract_support(&self) -> Result<(), BoxError> { Ok(()) }
//! # }
//! #
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let rlp_hex = "e8018504e3b292008252089428ee52a8f3d6e5d15f8b1319";
//! let ledger = LedgerVapory::new(Network::Mainnet, HidFactory, Prompts);
//!
//! // Address of the first account
//! let address = ledger.get_address_by_bip44_index(0).await?;
//! println!("Address: {address}");
//!
//! // Sign an RLP encoded transaction with the same account
//! let signature = ledger.sign_transaction_by_bip44_index(rlp_hex, 0).await?;
//! println!("Signature: {signature}");
//! # Ok(())
//! # }
//! ```

mod classify;
mod client;
mod config;
mod connection;
mod device;
mod error;
mod retry;
mod signature;
mod types;

pub use classify::{
    Disposition, INSECURE_ORIGIN_MESSAGE, INVALID_INPUT_MESSAGE, RecoveryAction,
    SECURITY_EXCEPTION_MESSAGE, UNKNOWN_ERROR_MESSAGE, classify, status_words, u2f_codes,
};
pub use client::LedgerVapory;
pub use config::Settings;
pub use connection::LockingConnection;
pub use device::{
    AddressResponse, ConnectionFactory, DeviceRequest, DeviceResponse, RecoveryHandler, VaporyApi,
};
pub use error::{BoxError, DeviceError, Error, ErrorKind, Result};
pub use retry::{RetryPolicy, call_with_recovery};
pub use signature::{RawSignature, Signature, SignatureError};
pub use types::{
    Bip32Path, DEFAULT_BIP44_INDEX, DEFAULT_MAX_RECOVERIES, Network, VAPORY_COIN_TYPE,
    is_hex_payload,
};
