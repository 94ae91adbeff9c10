//! Decision table mapping device failures to recovery actions or terminal errors

use crate::error::{DeviceError, Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// APDU status words the Vapory application reports
pub mod status_words {
    /// INS not supported: another application is open on the device.
    pub const INS_NOT_SUPPORTED: u16 = 0x6d00;
    /// Wrong length: the dashboard answers this instead of the Vapory app.
    pub const WRONG_LENGTH: u16 = 0x6700;
    pub const INVALID_DATA: u16 = 0x6a80;
    pub const CONTRACT_DATA_DISABLED: u16 = 0x6804;
}

/// U2F error codes surfaced by browser transports
pub mod u2f_codes {
    pub const BAD_REQUEST: u32 = 2;
    pub const TIMEOUT: u32 = 5;
}

pub const SECURITY_EXCEPTION_MESSAGE: &str = "Security Exception.  This likely means you provided an invalid BIP32 path.  Do you have hardening in the right places?";
pub const INSECURE_ORIGIN_MESSAGE: &str = "Bad Request.  This likely means you are trying to use u2f from a webpage served by HTTP (instead of HTTPS).";
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error from ledger (see source).";

/// Side effect the application performs to bring the device into a usable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    ConnectDevice,
    OpenVaporyApp,
    SwitchLedgerMode,
    EnableContractSupport,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecoveryAction::ConnectDevice => "connect device",
            RecoveryAction::OpenVaporyApp => "open Vapory app",
            RecoveryAction::SwitchLedgerMode => "switch Ledger mode",
            RecoveryAction::EnableContractSupport => "enable contract support",
        };
        f.write_str(name)
    }
}

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Run the recovery action, then retry the same attempt.
    Recover(RecoveryAction),
    /// Stop and report an error of this kind.
    Fail {
        kind: ErrorKind,
        message: &'static str,
    },
}

impl Disposition {
    const fn fail(kind: ErrorKind, message: &'static str) -> Self {
        Disposition::Fail { kind, message }
    }
}

/// Classify a device failure
pub fn classify(error: &DeviceError) -> Disposition {
    use status_words::*;

    match error {
        DeviceError::NoDeviceFound => Disposition::Recover(RecoveryAction::ConnectDevice),
        DeviceError::Status(INS_NOT_SUPPORTED | WRONG_LENGTH) => {
            Disposition::Recover(RecoveryAction::OpenVaporyApp)
        }
        DeviceError::InvalidChannel => Disposition::Recover(RecoveryAction::SwitchLedgerMode),
        DeviceError::Status(INVALID_DATA) => {
            Disposition::fail(ErrorKind::BadRequest, SECURITY_EXCEPTION_MESSAGE)
        }
        DeviceError::Status(CONTRACT_DATA_DISABLED) => {
            Disposition::Recover(RecoveryAction::EnableContractSupport)
        }
        DeviceError::U2f {
            code: u2f_codes::BAD_REQUEST,
            ..
        } => Disposition::fail(ErrorKind::BadRequest, INSECURE_ORIGIN_MESSAGE),
        DeviceError::U2f {
            code: u2f_codes::TIMEOUT,
            ..
        } => Disposition::Recover(RecoveryAction::ConnectDevice),
        DeviceError::InvalidHex => {
            Disposition::fail(ErrorKind::InvalidInput, INVALID_INPUT_MESSAGE)
        }
        // Implementations may hand over the raw text; give it a second chance.
        DeviceError::Message(text) => match DeviceError::from_message(text) {
            DeviceError::Message(_) => Disposition::fail(ErrorKind::Unknown, UNKNOWN_ERROR_MESSAGE),
            parsed => classify(&parsed),
        },
        DeviceError::Status(_) | DeviceError::U2f { .. } | DeviceError::Other(_) => {
            Disposition::fail(ErrorKind::Unknown, UNKNOWN_ERROR_MESSAGE)
        }
    }
}

/// Build the caller-facing error for a terminal disposition
pub(crate) fn terminal_error(kind: ErrorKind, message: &str, cause: DeviceError) -> Error {
    match kind {
        ErrorKind::InvalidInput => Error::InvalidInput {
            message: message.to_string(),
            source: Some(cause),
        },
        ErrorKind::BadRequest => Error::BadRequest {
            message: message.to_string(),
            source: Some(cause),
        },
        ErrorKind::Unknown | ErrorKind::Recovery | ErrorKind::Config => {
            Error::unknown(message, cause)
        }
    }
}
