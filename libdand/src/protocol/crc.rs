// libdand/src/protocol/crc.rs

//! CRC-A (ISO 14443-3) and odd parity.

use crate::constants::CRC_A_PRESET;
use crate::{Error, Result};

/// Compute CRC-A (ISO 14443-3 Annex B) over `data`
pub fn crc_a(data: &[u8]) -> u16 {
    data.iter().fold(CRC_A_PRESET, |crc, &b| {
        let mut ch = b ^ (crc & 0x00ff) as u8;
        ch ^= ch << 4;
        let ch = ch as u16;
        (crc >> 8) ^ (ch << 8) ^ (ch << 3) ^ (ch >> 4)
    })
}

/// CRC-A in transmission order (least significant byte first)
pub fn crc_a_bytes(data: &[u8]) -> [u8; 2] {
    crc_a(data).to_le_bytes()
}

/// Append CRC-A to `buf`
pub fn append_crc_a(buf: &mut Vec<u8>) {
    let crc = crc_a_bytes(buf);
    buf.extend_from_slice(&crc);
}

/// Check that the last two bytes of `frame` are the CRC-A of the rest.
/// Frames shorter than three bytes never carry a valid CRC.
pub fn check_crc_a(frame: &[u8]) -> bool {
    if frame.len() < 3 {
        return false;
    }
    let (data, tail) = frame.split_at(frame.len() - 2);
    crc_a_bytes(data) == [tail[0], tail[1]]
}

/// Like `check_crc_a`, but reports what was expected.
pub fn verify_crc_a(frame: &[u8]) -> Result<()> {
    crate::protocol::parser::ensure_len(frame, 3)?;
    let (data, tail) = frame.split_at(frame.len() - 2);
    let expected = crc_a(data);
    let actual = u16::from_le_bytes([tail[0], tail[1]]);
    if expected != actual {
        return Err(Error::CrcMismatch { expected, actual });
    }
    Ok(())
}

/// Odd parity bit transmitted after `byte`
pub fn odd_parity(byte: u8) -> bool {
    byte.count_ones() % 2 == 0
}
