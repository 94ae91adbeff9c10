//! Common types used throughout ledger-vapory

use crate::error::{Error, Result};
use bitcoin::bip32::DerivationPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// BIP44 coin type used for every derived path
pub const VAPORY_COIN_TYPE: u32 = 60;
pub const DEFAULT_BIP44_INDEX: u32 = 0;
/// Recoveries allowed per device call before giving up
pub const DEFAULT_MAX_RECOVERIES: u32 = 8;

/// Vapory network the client is configured for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Ropsten,
    Rinkeby,
    Kovan,
    Private(u32),
}

impl Network {
    pub fn chain_id(&self) -> u32 {
        match self {
            Network::Mainnet => 1,
            Network::Ropsten => 3,
            Network::Rinkeby => 4,
            Network::Kovan => 42,
            Network::Private(chain_id) => *chain_id,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Ropsten => f.write_str("ropsten"),
            Network::Rinkeby => f.write_str("rinkeby"),
            Network::Kovan => f.write_str("kovan"),
            Network::Private(chain_id) => write!(f, "private({chain_id})"),
        }
    }
}

/// BIP32 derivation path, kept exactly as given
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bip32Path(String);

impl Bip32Path {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Standard account path `m/44'/60'/0'/0/{index}`
    pub fn from_bip44_index(index: u32) -> Self {
        // FIXME: use the network's coin type once the device app stops
        // rejecting anything but 60 (LedgerHQ/blue-app-eth#2)
        Self(format!("m/44'/{VAPORY_COIN_TYPE}'/0'/0/{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Child numbers of the path, hardened ones with the high bit set
    pub fn components(&self) -> Result<Vec<u32>> {
        let derivation = DerivationPath::from_str(&self.0)
            .map_err(|_| Error::invalid_input(format!("Invalid derivation path: {}", self.0)))?;

        Ok(derivation
            .into_iter()
            .map(|child| u32::from(*child))
            .collect())
    }
}

impl Default for Bip32Path {
    fn default() -> Self {
        Self::from_bip44_index(DEFAULT_BIP44_INDEX)
    }
}

impl fmt::Display for Bip32Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Bip32Path {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Bip32Path {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Bip32Path {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Whether `payload` consists of hex digits only (the empty string included)
pub fn is_hex_payload(payload: &str) -> bool {
    payload.chars().all(|c| c.is_ascii_hexdigit())
}
