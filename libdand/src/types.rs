// libdand/src/types.rs

//! Small domain types: UID, access width, intent and privilege.

use crate::Error;
use std::convert::TryFrom;

/// UID - Newtype Pattern (4, 7 or 10 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uid {
    bytes: [u8; 10],
    len: u8,
}

impl Uid {
    /// Single size UID, one cascade level
    pub fn single(bytes: [u8; 4]) -> Self {
        let mut arr = [0u8; 10];
        arr[..4].copy_from_slice(&bytes);
        Self { bytes: arr, len: 4 }
    }

    /// Double size UID
    pub fn double(bytes: [u8; 7]) -> Self {
        let mut arr = [0u8; 10];
        arr[..7].copy_from_slice(&bytes);
        Self { bytes: arr, len: 7 }
    }

    /// Triple size UID
    pub fn triple(bytes: [u8; 10]) -> Self {
        Self {
            bytes,
            len: 10,
        }
    }

    /// UID bytes without padding
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Number of cascade levels needed to transmit this UID (1..=3)
    pub fn cascade_levels(&self) -> u8 {
        match self.len {
            4 => 1,
            7 => 2,
            _ => 3,
        }
    }

    /// The four UID bytes (cascade tag included) sent at `level` (1-based).
    /// Returns None for levels beyond this UID size.
    pub fn cascade_bytes(&self, level: u8) -> Option<[u8; 4]> {
        if level == 0 || level > self.cascade_levels() {
            return None;
        }
        let b = &self.bytes;
        let last = level == self.cascade_levels();
        let start = (level as usize - 1) * 3;
        let out = if last {
            [b[start], b[start + 1], b[start + 2], b[start + 3]]
        } else {
            [crate::constants::CASCADE_TAG, b[start], b[start + 1], b[start + 2]]
        };
        Some(out)
    }

    /// Uppercase hex, no separators
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Uid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match bytes.len() {
            4 | 7 | 10 => {
                let mut arr = [0u8; 10];
                arr[..bytes.len()].copy_from_slice(bytes);
                Ok(Self {
                    bytes: arr,
                    len: bytes.len() as u8,
                })
            }
            n => Err(Error::InvalidLength {
                expected: if n < 7 { 4 } else { 7 },
                actual: n,
            }),
        }
    }
}

/// Block check character over the four bytes of a cascade level
pub fn bcc(cl: &[u8; 4]) -> u8 {
    cl.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Width of a single memory access
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessWidth {
    /// 8 bits
    Byte = 1,
    /// 16 bits
    HalfWord = 2,
    /// 32 bits
    Word = 4,
}

impl AccessWidth {
    /// Size in bytes
    pub fn bytes(&self) -> usize {
        *self as usize
    }

    /// Whether `address` is a multiple of the width
    pub fn is_aligned(&self, address: u32) -> bool {
        address % (*self as u32) == 0
    }
}

/// What a request wants to do with an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessIntent {
    /// Load
    Read,
    /// Store
    Write,
}

/// Privilege of a region or NVM page as seen from the contactless interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessState {
    /// Both
    ReadWrite,
    /// Reads only
    ReadOnly,
    /// Writes only
    WriteOnly,
    /// Neither
    NoAccess,
}

impl AccessState {
    /// Decode a privilege byte. The high nibble grants read access, the low
    /// nibble grants write access; partially set nibbles grant nothing.
    pub fn from_privilege(byte: u8) -> Self {
        let read = byte & 0xF0 == 0xF0;
        let write = byte & 0x0F == 0x0F;
        match (read, write) {
            (true, true) => Self::ReadWrite,
            (true, false) => Self::ReadOnly,
            (false, true) => Self::WriteOnly,
            (false, false) => Self::NoAccess,
        }
    }

    /// Whether `intent` is allowed
    pub fn permits(&self, intent: AccessIntent) -> bool {
        match (self, intent) {
            (Self::ReadWrite, _) => true,
            (Self::ReadOnly, AccessIntent::Read) => true,
            (Self::WriteOnly, AccessIntent::Write) => true,
            _ => false,
        }
    }
}

impl Default for AccessState {
    fn default() -> Self {
        AccessState::NoAccess
    }
}
