//! Unified error types for the therapy firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! so they can be passed through the registry and service without
//! allocation.
//!
//! Only [`Error::Link`] raised during boot is fatal. Attribute errors are
//! reported through the event sink and otherwise dropped: the remote writer
//! only ever observes attribute values.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The wireless link could not be brought up.
    Link(LinkError),
    /// An inbound attribute write was refused.
    Attribute(AttributeError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Attribute(e) => write!(f, "attribute: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Wireless link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Controller / host stack failed to start.
    StackInitFailed,
    /// A service group could not be registered.
    RegistrationFailed,
    /// Advertising could not be started.
    AdvertiseFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackInitFailed => write!(f, "BLE stack initialisation failed"),
            Self::RegistrationFailed => write!(f, "GATT service registration failed"),
            Self::AdvertiseFailed => write!(f, "advertising start failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Attribute write errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeError {
    /// Payload longer than the attribute's declared maximum.
    PayloadTooLong,
    /// Text payload is not valid UTF-8.
    InvalidUtf8,
    /// The attribute is not remotely writable.
    NotWritable,
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLong => write!(f, "write exceeds max attribute length"),
            Self::InvalidUtf8 => write!(f, "write contains invalid UTF-8"),
            Self::NotWritable => write!(f, "attribute is read-only"),
        }
    }
}

impl From<AttributeError> for Error {
    fn from(e: AttributeError) -> Self {
        Self::Attribute(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
