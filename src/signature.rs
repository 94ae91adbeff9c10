//! Transaction signatures returned by the Vapory application

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Signature as reported by the device: hex encoded `v`, `r` and `s`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSignature {
    pub v: String,
    pub r: String,
    pub s: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignatureError {
    #[error("Invalid hex in signature component {component}: {source}")]
    Hex {
        component: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Signature component {component} too long: expected at most {expected} bytes, got {actual}")]
    Length {
        component: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Recoverable ECDSA signature over a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub v: u8,
    #[serde(with = "hex::serde")]
    pub r: [u8; 32],
    #[serde(with = "hex::serde")]
    pub s: [u8; 32],
}

impl Signature {
    /// `r || s || v`
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl TryFrom<RawSignature> for Signature {
    type Error = SignatureError;

    fn try_from(raw: RawSignature) -> Result<Self, Self::Error> {
        let [v] = decode_component::<1>("v", &raw.v)?;
        let r = decode_component::<32>("r", &raw.r)?;
        let s = decode_component::<32>("s", &raw.s)?;
        Ok(Self { v, r, s })
    }
}

/// Decode a big-endian hex component, left padding it to `N` bytes
fn decode_component<const N: usize>(
    component: &'static str,
    value: &str,
) -> Result<[u8; N], SignatureError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    let decoded = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    }
    .map_err(|source| SignatureError::Hex { component, source })?;

    if decoded.len() > N {
        return Err(SignatureError::Length {
            component,
            expected: N,
            actual: decoded.len(),
        });
    }

    let mut bytes = [0u8; N];
    bytes[N - decoded.len()..].copy_from_slice(&decoded);
    Ok(bytes)
}
