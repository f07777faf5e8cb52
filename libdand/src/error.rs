// libdand/src/error.rs

//! Crate error type.

use thiserror::Error;

/// Common error type
#[derive(Error, Debug)]
pub enum Error {
    /// A buffer or frame has the wrong size
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Length found
        actual: usize,
    },

    /// Malformed frame or request
    #[error("frame format error: {0}")]
    FrameFormat(String),

    /// Trailing CRC-A does not match the data
    #[error("crc mismatch: expected {expected:#06x}, got {actual:#06x}")]
    CrcMismatch {
        /// CRC computed over the data
        expected: u16,
        /// CRC carried by the frame
        actual: u16,
    },

    /// Command code outside the Dandelion command set
    #[error("unknown command: {0:#04x}")]
    UnknownCommand(u8),

    /// The memory bus has nothing at `address`
    #[error("bus fault at address {address:#010x}")]
    BusFault {
        /// First unreachable address
        address: u32,
    },

    /// Call or message for an empty registry slot
    #[error("no function registered for id {0:#04x}")]
    FunctionNotRegistered(u8),

    /// The id names the mailbox message processor, which only the
    /// dispatcher can run
    #[error("function {0:#04x} cannot be called from a mailbox message")]
    NotCallable(u8),

    /// Memory protection refused an access
    #[error("{intent} of {address:#010x} denied")]
    AccessDenied {
        /// Address of the access
        address: u32,
        /// `"read"` or `"write"`
        intent: &'static str,
    },

    /// Call or send_message is switched off in the protection config
    #[error("message/call execution is disabled")]
    MessageCallDisabled,

    /// A builder was finished without a required part
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Rejected by `TagConfig::validate`
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised by a peripheral driver
    #[error("peripheral error: {0}")]
    Peripheral(String),
}

/// Result alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
