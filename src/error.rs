//! Error types for ledger-vapory

use crate::classify::RecoveryAction;
use thiserror::Error;

/// Boxed error used for collaborator failures the crate does not inspect.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure signal reported by a [`VaporyApi`](crate::VaporyApi) handle.
///
/// The Ledger transport libraries report failures as bare strings
/// (`"Invalid status 6d00"`) or as objects carrying a numeric U2F code.
/// Implementations translate those into the variants below, either directly
/// or through [`DeviceError::from_message`].
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("No device found")]
    NoDeviceFound,

    /// APDU status word returned by the device application.
    #[error("Invalid status {0:04x}")]
    Status(u16),

    #[error("Invalid channel;")]
    InvalidChannel,

    #[error("U2F error: code={code}, message={message}")]
    U2f { code: u32, message: String },

    #[error("Invalid hex string")]
    InvalidHex,

    /// Text signal that did not match any known condition.
    #[error("{0}")]
    Message(String),

    #[error("Device API error: {0}")]
    Other(#[source] BoxError),
}

impl DeviceError {
    /// Translate a legacy text signal into a typed device error
    pub fn from_message(message: &str) -> Self {
        match message {
            "No device found" => Self::NoDeviceFound,
            "Invalid channel;" => Self::InvalidChannel,
            "Invalid hex string" => Self::InvalidHex,
            _ => match message.strip_prefix("Invalid status ").and_then(parse_status_word) {
                Some(status) => Self::Status(status),
                None => Self::Message(message.to_string()),
            },
        }
    }

    /// Wrap any other failure of the device API
    pub fn other(error: impl Into<BoxError>) -> Self {
        Self::Other(error.into())
    }
}

/// Status words are printed as exactly four lowercase hex digits
fn parse_status_word(word: &str) -> Option<u16> {
    if word.len() != 4 || !word.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    u16::from_str_radix(word, 16).ok()
}

/// Coarse category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    BadRequest,
    Unknown,
    Recovery,
    Config,
}

/// Errors surfaced to callers of [`LedgerVapory`](crate::LedgerVapory).
///
/// Recoverable device states never show up here: they are handled by the
/// recovery loop. The original device error is kept as the `source` of every
/// classified variant.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<DeviceError>,
    },

    #[error("{message}")]
    BadRequest {
        message: String,
        #[source]
        source: Option<DeviceError>,
    },

    #[error("{message}")]
    Unknown {
        message: String,
        #[source]
        source: BoxError,
    },

    /// A recovery callback supplied by the application failed.
    #[error("Recovery action '{action}' failed: {source}")]
    Recovery {
        action: RecoveryAction,
        #[source]
        source: BoxError,
    },

    #[error("Invalid settings: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::BadRequest { .. } => ErrorKind::BadRequest,
            Error::Unknown { .. } => ErrorKind::Unknown,
            Error::Recovery { .. } => ErrorKind::Recovery,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn unknown(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Unknown {
            message: message.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
