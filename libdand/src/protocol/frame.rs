// libdand/src/protocol/frame.rs

//! Raw bit streams and their classification.

use crate::constants::{NFC_DAND_CMD, NFC_SEL_1, NFC_SEL_2, NFC_SEL_3};
use crate::protocol::crc::{check_crc_a, odd_parity};
use crate::protocol::request::DandelionRequest;

/// Frame types of ISO 14443-3 section 6.2.3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FrameType {
    /// 7 bits
    #[display(fmt = "short")]
    Short,
    /// n x 8 bits with odd parity after every byte
    #[display(fmt = "standard")]
    Standard,
    /// 16..=48 bits, bit oriented
    #[display(fmt = "anticollision")]
    Anticollision,
    /// anything else
    #[display(fmt = "error")]
    Error,
}

/// Bits as delivered by the receiver: data bits packed LSB first into
/// bytes, plus the parity bit received after every complete byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    data: Vec<u8>,
    bit_len: usize,
    parity: Vec<bool>,
}

impl RawFrame {
    /// `parity[i]` is the bit received after byte `i`
    pub fn new(data: Vec<u8>, bit_len: usize, parity: Vec<bool>) -> Self {
        Self {
            data,
            bit_len,
            parity,
        }
    }

    /// 7-bit short frame (REQA, WUPA, ...)
    pub fn short(code: u8) -> Self {
        Self::new(vec![code & 0x7F], 7, Vec::new())
    }

    /// Byte-aligned frame with correct parity bits
    pub fn standard(bytes: &[u8]) -> Self {
        Self::bits(bytes, bytes.len() * 8)
    }

    /// First `bit_len` bits of `bytes`, parity generated for complete bytes
    pub fn bits(bytes: &[u8], bit_len: usize) -> Self {
        let parity = bytes.iter().take(bit_len / 8).map(|&b| odd_parity(b)).collect();
        Self::new(bytes.to_vec(), bit_len, parity)
    }

    /// Data bytes, LSB first on the air
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of data bits, parity excluded
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Received parity bits
    pub fn parity(&self) -> &[bool] {
        &self.parity
    }
}

/// A classified frame. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bit_len: usize,
    frame_type: FrameType,
    command: u8,
    parity_ok: bool,
    data: Vec<u8>,
    dand: Option<DandelionRequest>,
}

fn is_select_code(b: u8) -> bool {
    matches!(b, NFC_SEL_1 | NFC_SEL_2 | NFC_SEL_3)
}

impl Frame {
    /// Classify a received bit stream. Never fails: malformed input yields
    /// a frame of type `Error`.
    pub fn classify(raw: &RawFrame) -> Self {
        let bit_len = raw.bit_len();
        let needed = bit_len.div_ceil(8);
        let data = if raw.data().len() >= needed {
            raw.data()[..needed].to_vec()
        } else {
            Vec::new()
        };

        let frame_type = if data.is_empty() {
            FrameType::Error
        } else if bit_len == 7 {
            FrameType::Short
        } else if (16..=48).contains(&bit_len) && is_select_code(data[0]) {
            // SEL with NVB below 0x70 is bit oriented even when it happens
            // to end on a byte boundary
            FrameType::Anticollision
        } else if bit_len % 8 == 0 {
            FrameType::Standard
        } else if (16..=48).contains(&bit_len) {
            FrameType::Anticollision
        } else {
            FrameType::Error
        };

        let parity_ok = match frame_type {
            FrameType::Standard | FrameType::Anticollision => {
                let full = bit_len / 8;
                raw.parity().len() >= full
                    && data
                        .iter()
                        .take(full)
                        .zip(raw.parity())
                        .all(|(&b, &p)| odd_parity(b) == p)
            }
            _ => true,
        };

        let command = match frame_type {
            FrameType::Short => data[0] & 0x7F,
            FrameType::Standard | FrameType::Anticollision => data[0],
            FrameType::Error => 0x00,
        };

        // marker + command + crc at minimum
        let dand = if frame_type == FrameType::Standard && command == NFC_DAND_CMD && data.len() >= 4
        {
            DandelionRequest::decode(&data[1..data.len() - 2]).ok()
        } else {
            None
        };

        log::trace!(
            "classified {} bits [{}] as {} frame, cmd={:#04x}, parity_ok={}",
            bit_len,
            crate::utils::bytes_to_hex_spaced(&data),
            frame_type,
            command,
            parity_ok
        );

        Self {
            bit_len,
            frame_type,
            command,
            parity_ok,
            data,
            dand,
        }
    }

    /// Received data bits
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Classification result
    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    /// First byte, or the 7-bit code of a short frame
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Whether every complete byte had odd parity
    pub fn parity_ok(&self) -> bool {
        self.parity_ok
    }

    /// Received bytes (a trailing partial byte included, CRC included)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Embedded Dandelion request, if this is a DAND_CMD frame with a known
    /// command that fits the receive buffer.
    pub fn dandelion(&self) -> Option<&DandelionRequest> {
        self.dand.as_ref()
    }

    /// Whether the trailing two bytes are a valid CRC-A. Only standard
    /// frames carry a CRC.
    pub fn crc_ok(&self) -> bool {
        self.frame_type == FrameType::Standard && check_crc_a(&self.data)
    }
}
