//! Client settings

use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::types::Network;
use serde::{Deserialize, Serialize};

/// Settings for [`LedgerVapory`](crate::LedgerVapory); missing fields take their defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub network: Network,
    pub retry: RetryPolicy,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
