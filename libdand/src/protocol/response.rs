// libdand/src/protocol/response.rs

//! Reply frames and Dandelion status codes.

use crate::constants::TX_BUFFER_SIZE;
use crate::{Error, Result};

/// Status/acknowledge codes carried in the first byte of every Dandelion
/// reply.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DandStatus {
    /// Followed by the 4 bytes read
    #[display(fmt = "ack_read_word")]
    AckReadWord = 0x80,
    /// Followed by 2 bytes
    #[display(fmt = "ack_read_halfword")]
    AckReadHalfWord = 0x81,
    /// Followed by 1 byte
    #[display(fmt = "ack_read_byte")]
    AckReadByte = 0x82,
    /// Word written
    #[display(fmt = "ack_write_word")]
    AckWriteWord = 0x70,
    /// Half-word written
    #[display(fmt = "ack_write_halfword")]
    AckWriteHalfWord = 0x71,
    /// Byte written
    #[display(fmt = "ack_write_byte")]
    AckWriteByte = 0x72,
    /// Followed by the 32-bit function result
    #[display(fmt = "ack_call_func")]
    AckCallFunc = 0x90,
    /// Followed by the 32-bit function result
    #[display(fmt = "ack_send_msg")]
    AckSendMsg = 0x60,
    /// Followed by the echoed payload
    #[display(fmt = "rloopback")]
    RLoopback = 0xFF,
    /// Request CRC wrong
    #[display(fmt = "error_rec_crc")]
    ErrorRecCrc = 0xAA,
    /// Request parity wrong
    #[display(fmt = "error_rec_crcp")]
    ErrorRecCrcParity = 0xA5,
    /// Read refused or faulted
    #[display(fmt = "error_read_protected")]
    ErrorReadProtected = 0xC0,
    /// Write refused or faulted
    #[display(fmt = "error_write_protected")]
    ErrorWriteProtected = 0xD0,
    /// Address not aligned to the access width
    #[display(fmt = "error_mis_aligned")]
    ErrorMisAligned = 0xDD,
    /// Unknown command, bad length, unregistered id or unselected tag
    #[display(fmt = "error_unknown_cmd")]
    ErrorUnknownCmd = 0xAF,
    /// Call or send_message switched off
    #[display(fmt = "error_message_call_disabled")]
    ErrorMessageCallDisabled = 0xED,
}

impl DandStatus {
    /// Wire code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// `None` for bytes that are not a status
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x80 => Some(Self::AckReadWord),
            0x81 => Some(Self::AckReadHalfWord),
            0x82 => Some(Self::AckReadByte),
            0x70 => Some(Self::AckWriteWord),
            0x71 => Some(Self::AckWriteHalfWord),
            0x72 => Some(Self::AckWriteByte),
            0x90 => Some(Self::AckCallFunc),
            0x60 => Some(Self::AckSendMsg),
            0xFF => Some(Self::RLoopback),
            0xAA => Some(Self::ErrorRecCrc),
            0xA5 => Some(Self::ErrorRecCrcParity),
            0xC0 => Some(Self::ErrorReadProtected),
            0xD0 => Some(Self::ErrorWriteProtected),
            0xDD => Some(Self::ErrorMisAligned),
            0xAF => Some(Self::ErrorUnknownCmd),
            0xED => Some(Self::ErrorMessageCallDisabled),
            _ => None,
        }
    }

    /// True for the `Error*` codes
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ErrorRecCrc
                | Self::ErrorRecCrcParity
                | Self::ErrorReadProtected
                | Self::ErrorWriteProtected
                | Self::ErrorMisAligned
                | Self::ErrorUnknownCmd
                | Self::ErrorMessageCallDisabled
        )
    }
}

/// Reply frame handed to the transmitter. Used both for Dandelion replies
/// and for the link layer's own answers (ATQA, SAK, UID bits); a frame with
/// `send_reply == false` means no response.
///
/// Anticollision answers may start in the middle of a byte: `first_bit`
/// is the index (LSB first) of the first transmitted bit of `payload[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DandelionResponse {
    bit_length: usize,
    first_bit: u8,
    send_reply: bool,
    append_checksum: bool,
    payload: [u8; TX_BUFFER_SIZE],
}

impl Default for DandelionResponse {
    fn default() -> Self {
        Self::none()
    }
}

impl DandelionResponse {
    /// No reply at all
    pub fn none() -> Self {
        Self {
            bit_length: 0,
            first_bit: 0,
            send_reply: false,
            append_checksum: false,
            payload: [0u8; TX_BUFFER_SIZE],
        }
    }

    /// Byte-aligned reply
    pub fn with_bytes(bytes: &[u8], append_checksum: bool) -> Result<Self> {
        Self::from_bit(bytes, 0, append_checksum)
    }

    /// Reply made of `bytes` minus the `first_bit` low bits of the first
    /// byte, which the reader already knows.
    pub fn from_bit(bytes: &[u8], first_bit: u8, append_checksum: bool) -> Result<Self> {
        if bytes.len() > TX_BUFFER_SIZE {
            return Err(Error::InvalidLength {
                expected: TX_BUFFER_SIZE,
                actual: bytes.len(),
            });
        }
        if first_bit >= 8 || (bytes.is_empty() && first_bit != 0) {
            return Err(Error::FrameFormat(format!(
                "first bit {} outside a {} byte reply",
                first_bit,
                bytes.len()
            )));
        }
        let mut payload = [0u8; TX_BUFFER_SIZE];
        payload[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bit_length: bytes.len() * 8 - usize::from(first_bit),
            first_bit,
            send_reply: true,
            append_checksum,
            payload,
        })
    }

    /// Single status byte with CRC
    pub fn status(status: DandStatus) -> Self {
        let mut r = Self::none();
        r.payload[0] = status.code();
        r.bit_length = 8;
        r.send_reply = true;
        r.append_checksum = true;
        r
    }

    /// Status byte followed by `data`, with CRC. Data that would not fit
    /// is truncated to the transmit buffer.
    pub fn status_with(status: DandStatus, data: &[u8]) -> Self {
        let mut r = Self::status(status);
        let n = data.len().min(TX_BUFFER_SIZE - 1);
        r.payload[1..1 + n].copy_from_slice(&data[..n]);
        r.bit_length = (1 + n) * 8;
        r
    }

    /// Reset to "no response"
    pub fn clear(&mut self) {
        *self = Self::none();
    }

    /// Number of bits to transmit
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// Index of the first transmitted bit within `payload()[0]`
    pub fn first_bit(&self) -> u8 {
        self.first_bit
    }

    /// Whether anything is transmitted
    pub fn send_reply(&self) -> bool {
        self.send_reply
    }

    /// Whether CRC-A follows the payload on the air
    pub fn append_checksum(&self) -> bool {
        self.append_checksum
    }

    /// Bytes holding the reply bits, the partly sent first byte included
    pub fn payload(&self) -> &[u8] {
        let held = (usize::from(self.first_bit) + self.bit_length).div_ceil(8);
        &self.payload[..held]
    }

    /// Transmitted bits in air order (LSB of each byte first)
    pub fn bits(&self) -> Vec<bool> {
        let start = usize::from(self.first_bit);
        (start..start + self.bit_length)
            .map(|i| (self.payload[i / 8] >> (i % 8)) & 1 == 1)
            .collect()
    }

    /// Status code of a Dandelion reply
    pub fn status_code(&self) -> Option<DandStatus> {
        if !self.send_reply || self.first_bit != 0 || self.bit_length < 8 {
            return None;
        }
        DandStatus::from_code(self.payload[0])
    }

    /// Bytes to hand to the transmitter: the transmitted bits packed LSB
    /// first from bit 0, CRC-A appended when requested.
    pub fn to_wire(&self) -> Vec<u8> {
        if !self.send_reply {
            return Vec::new();
        }
        let mut out = if self.first_bit == 0 {
            self.payload().to_vec()
        } else {
            let mut packed = vec![0u8; self.bit_length.div_ceil(8)];
            for (i, bit) in self.bits().into_iter().enumerate() {
                if bit {
                    packed[i / 8] |= 1 << (i % 8);
                }
            }
            packed
        };
        if self.append_checksum {
            crate::protocol::crc::append_crc_a(&mut out);
        }
        out
    }
}
