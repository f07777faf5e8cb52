// libdand/src/link/anticollision.rs

//! ISO 14443-3 bit-oriented anticollision and SELECT for one cascade level.

use crate::constants::{NFC_SEL_1, NFC_SEL_2, NFC_SEL_3, NVB_SELECT, SAK_CASCADE_BIT};
use crate::protocol::{DandelionResponse, Frame, FrameType};
use crate::types::{bcc, Uid};

/// Result of a SEL frame at the current cascade level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The known bits match: send the remaining UID bits, stay ready
    UidBits(DandelionResponse),
    /// SELECT matched this level. `complete` is false while more cascade
    /// levels follow.
    Selected {
        /// SAK reply to transmit
        sak: DandelionResponse,
        /// Whether the UID is complete
        complete: bool,
    },
    /// The frame does not address this tag
    NotAddressed,
}

/// SEL command of cascade `level` (1..=3)
pub fn sel_code(level: u8) -> Option<u8> {
    match level {
        1 => Some(NFC_SEL_1),
        2 => Some(NFC_SEL_2),
        3 => Some(NFC_SEL_3),
        _ => None,
    }
}

/// Bit `i` of `bytes`, LSB first
fn bit(bytes: &[u8], i: usize) -> bool {
    bytes.get(i / 8).is_some_and(|b| (b >> (i % 8)) & 1 == 1)
}

/// Anticollision state of one tag: its UID and the cascade level reached.
#[derive(Debug, Clone)]
pub struct Anticollision {
    uid: Uid,
    sak: u8,
    level: u8,
}

impl Anticollision {
    /// `sak` is the value sent once the UID is complete.
    pub fn new(uid: Uid, sak: u8) -> Self {
        Self { uid, sak, level: 1 }
    }

    /// Current cascade level, 1-based
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Back to cascade level 1
    pub fn reset(&mut self) {
        self.level = 1;
    }

    /// CLn followed by its BCC
    fn level_bytes(&self) -> Option<[u8; 5]> {
        let cl = self.uid.cascade_bytes(self.level)?;
        Some([cl[0], cl[1], cl[2], cl[3], bcc(&cl)])
    }

    /// Process a SEL frame (anticollision or full SELECT).
    pub fn handle(&mut self, frame: &Frame) -> SelectOutcome {
        let data = frame.data();
        let expected = match sel_code(self.level) {
            Some(c) => c,
            None => return SelectOutcome::NotAddressed,
        };
        if data.len() < 2 || data[0] != expected {
            return SelectOutcome::NotAddressed;
        }
        let level_bytes = match self.level_bytes() {
            Some(b) => b,
            None => return SelectOutcome::NotAddressed,
        };
        let nvb = data[1];

        match frame.frame_type() {
            FrameType::Standard if nvb == NVB_SELECT => {
                // SEL NVB CLn BCC CRC
                if data.len() != 9 || !frame.crc_ok() || data[2..7] != level_bytes {
                    return SelectOutcome::NotAddressed;
                }
                self.select()
            }
            FrameType::Anticollision => {
                let known = usize::from(nvb >> 4).saturating_sub(2) * 8 + usize::from(nvb & 0x0F);
                if nvb >> 4 < 2 || known >= 40 || frame.bit_len() != 16 + known {
                    return SelectOutcome::NotAddressed;
                }
                if (0..known).any(|i| bit(&data[2..], i) != bit(&level_bytes, i)) {
                    return SelectOutcome::NotAddressed;
                }
                let first_bit = (known % 8) as u8;
                match DandelionResponse::from_bit(&level_bytes[known / 8..], first_bit, false) {
                    Ok(r) => SelectOutcome::UidBits(r),
                    Err(_) => SelectOutcome::NotAddressed,
                }
            }
            _ => SelectOutcome::NotAddressed,
        }
    }

    fn select(&mut self) -> SelectOutcome {
        let complete = self.level >= self.uid.cascade_levels();
        let sak = if complete {
            self.sak & !SAK_CASCADE_BIT
        } else {
            SAK_CASCADE_BIT
        };
        log::debug!(
            "cascade level {} selected, uid {}",
            self.level,
            if complete { "complete" } else { "incomplete" }
        );
        if !complete {
            self.level += 1;
        }
        let sak = DandelionResponse::with_bytes(&[sak], true).unwrap_or_default();
        SelectOutcome::Selected { sak, complete }
    }
}
