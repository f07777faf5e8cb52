//! Test support helpers intended for use by unit and integration tests,
//! benches and the demo.
//!
//! They build a tag over `SimulatedMemory` and encode reader frames the way
//! a PCD puts them on the air (CRC-A and parity included).
#![allow(dead_code)]

use crate::constants::*;
use crate::memory::SimulatedMemory;
use crate::protocol::crc::append_crc_a;
use crate::protocol::{DandCommand, DandelionRequest, RawFrame};
use crate::tag::{Initialized, Tag, TagConfig};
use crate::types::{bcc, Uid};
use crate::Result;

/// SimulatedMemory with ROM1, ROM2, RAM1, RAM2 and NVM backed
#[doc(hidden)]
pub fn simulated_memory() -> SimulatedMemory {
    let mut m = SimulatedMemory::new();
    for (start, stop) in [
        (ROM1_START, ROM1_STOP),
        (ROM2_START, ROM2_STOP),
        (RAM1_START, RAM1_STOP),
        (RAM2_START, RAM2_STOP),
        (NVM_BASE, NVM_STOP),
    ] {
        m.map(start, stop - start);
    }
    m
}

/// Tag<Initialized> over `memory`
#[doc(hidden)]
pub fn initialized_tag_with(config: TagConfig, memory: SimulatedMemory) -> Result<Tag<Initialized>> {
    Tag::new(config, Box::new(memory))?.initialize()
}

/// Tag<Initialized> over `simulated_memory()`
#[doc(hidden)]
pub fn initialized_tag(config: TagConfig) -> Result<Tag<Initialized>> {
    initialized_tag_with(config, simulated_memory())
}

/// Standard frame of `bytes` followed by CRC-A
#[doc(hidden)]
pub fn reader_frame(bytes: &[u8]) -> RawFrame {
    let mut v = bytes.to_vec();
    append_crc_a(&mut v);
    RawFrame::standard(&v)
}

/// REQA short frame
#[doc(hidden)]
pub fn reqa() -> RawFrame {
    RawFrame::short(NFC_REQA)
}

/// WUPA short frame
#[doc(hidden)]
pub fn wupa() -> RawFrame {
    RawFrame::short(NFC_WUPA)
}

/// HLTA with CRC
#[doc(hidden)]
pub fn hlta() -> RawFrame {
    reader_frame(&[NFC_HLTA, 0x00])
}

/// RATS_DAND with CRC
#[doc(hidden)]
pub fn rats_dand() -> RawFrame {
    reader_frame(&[NFC_RATS_DAND, 0x00])
}

/// DESELECT_DAND with CRC
#[doc(hidden)]
pub fn deselect_dand() -> RawFrame {
    reader_frame(&[NFC_DESELECT_DAND])
}

/// Full SELECT of `level` (1-based) for `uid`
#[doc(hidden)]
pub fn select(uid: &Uid, level: u8) -> Option<RawFrame> {
    let sel = crate::link::anticollision::sel_code(level)?;
    let cl = uid.cascade_bytes(level)?;
    let mut b = vec![sel, NVB_SELECT];
    b.extend_from_slice(&cl);
    b.push(bcc(&cl));
    Some(reader_frame(&b))
}

/// Dandelion request frame
#[doc(hidden)]
pub fn dand_frame(command: DandCommand, payload: &[u8]) -> Result<RawFrame> {
    let req = DandelionRequest::new(command, payload)?;
    Ok(reader_frame(&req.encode()))
}

/// Walk a tag through REQA, SELECT (all levels) and RATS_DAND.
#[doc(hidden)]
pub fn enter_prot_dand(tag: &mut Tag<Initialized>) {
    let uid = tag.config().uid;
    tag.handle_frame(&reqa());
    for level in 1..=uid.cascade_levels() {
        if let Some(f) = select(&uid, level) {
            tag.handle_frame(&f);
        }
    }
    tag.handle_frame(&rats_dand());
}
