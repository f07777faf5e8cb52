// libdand/src/protocol/request.rs

//! Dandelion command codes and decoded requests.

use crate::constants::RX_BUFFER_SIZE;
use crate::types::AccessWidth;
use crate::{Error, Result};

/// Commands of the Dandelion protocol. The discriminant is the byte
/// following the DAND_CMD marker on the wire.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DandCommand {
    /// Read 4 bytes at a 32-bit address
    #[display(fmt = "read_word")]
    ReadWord = 0x80,
    /// Read 2 bytes
    #[display(fmt = "read_halfword")]
    ReadHalfWord = 0x81,
    /// Read 1 byte
    #[display(fmt = "read_byte")]
    ReadByte = 0x82,
    /// Address followed by a 32-bit value
    #[display(fmt = "write_word")]
    WriteWord = 0x70,
    /// Address followed by a 16-bit value
    #[display(fmt = "write_halfword")]
    WriteHalfWord = 0x71,
    /// Address followed by one byte
    #[display(fmt = "write_byte")]
    WriteByte = 0x72,
    /// Run a registered function on the mailbox as it is
    #[display(fmt = "call")]
    Call = 0x90,
    /// Fill the mailbox, then run a function
    #[display(fmt = "send_message")]
    SendMessage = 0x60,
    /// Echo the payload
    #[display(fmt = "loopback")]
    Loopback = 0xFF,
}

impl DandCommand {
    /// `None` for codes outside the command set
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x80 => Some(Self::ReadWord),
            0x81 => Some(Self::ReadHalfWord),
            0x82 => Some(Self::ReadByte),
            0x70 => Some(Self::WriteWord),
            0x71 => Some(Self::WriteHalfWord),
            0x72 => Some(Self::WriteByte),
            0x90 => Some(Self::Call),
            0x60 => Some(Self::SendMessage),
            0xFF => Some(Self::Loopback),
            _ => None,
        }
    }

    /// Wire code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Access width of read/write commands
    pub fn width(&self) -> Option<AccessWidth> {
        match self {
            Self::ReadWord | Self::WriteWord => Some(AccessWidth::Word),
            Self::ReadHalfWord | Self::WriteHalfWord => Some(AccessWidth::HalfWord),
            Self::ReadByte | Self::WriteByte => Some(AccessWidth::Byte),
            _ => None,
        }
    }

    /// One of the three reads
    pub fn is_read(&self) -> bool {
        matches!(self, Self::ReadWord | Self::ReadHalfWord | Self::ReadByte)
    }

    /// One of the three writes
    pub fn is_write(&self) -> bool {
        matches!(self, Self::WriteWord | Self::WriteHalfWord | Self::WriteByte)
    }

    /// Whether `len` payload bytes is what this command carries.
    pub fn accepts_payload_len(&self, len: usize) -> bool {
        match self {
            Self::ReadWord | Self::ReadHalfWord | Self::ReadByte => len == 4,
            Self::WriteWord => len == 8,
            Self::WriteHalfWord => len == 6,
            Self::WriteByte => len == 5,
            Self::Call => len == 1,
            // id followed by whole message words
            Self::SendMessage => len >= 1 && (len - 1) % 4 == 0,
            // the echo has to fit next to the status byte
            Self::Loopback => len < crate::constants::TX_BUFFER_SIZE,
        }
    }
}

/// A Dandelion request as extracted from a standard frame. The payload
/// excludes the command byte and the trailing CRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DandelionRequest {
    command: DandCommand,
    payload: [u8; RX_BUFFER_SIZE],
    len: usize,
}

impl DandelionRequest {
    /// Build a request. Payloads longer than the receive buffer are rejected.
    pub fn new(command: DandCommand, payload: &[u8]) -> Result<Self> {
        if payload.len() > RX_BUFFER_SIZE {
            return Err(Error::InvalidLength {
                expected: RX_BUFFER_SIZE,
                actual: payload.len(),
            });
        }
        let mut buf = [0u8; RX_BUFFER_SIZE];
        buf[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            command,
            payload: buf,
            len: payload.len(),
        })
    }

    /// Parse `cmd || payload` as it follows the DAND_CMD marker.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let code = crate::protocol::parser::byte_at(data, 0)?;
        let command = DandCommand::from_code(code).ok_or(Error::UnknownCommand(code))?;
        Self::new(command, &data[1..])
    }

    /// Decoded command
    pub fn command(&self) -> DandCommand {
        self.command
    }

    /// Bytes after the command code, CRC excluded
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len]
    }

    /// Address carried in payload bytes 0..4, most significant byte first
    pub fn address(&self) -> Result<u32> {
        crate::protocol::parser::be_u32_at(self.payload(), 0)
    }

    /// Encode as `DAND_CMD || cmd || payload` (no CRC)
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.len);
        out.push(crate::constants::NFC_DAND_CMD);
        out.push(self.command.code());
        out.extend_from_slice(self.payload());
        out
    }
}
