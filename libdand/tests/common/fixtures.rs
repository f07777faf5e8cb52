// fixtures.rs: commonly used tags, configurations and frames

use libdand::constants::*;
use libdand::protocol::{DandCommand, DandStatus, DandelionResponse, RawFrame};
use libdand::tag::{Initialized, Tag, TagConfig};
use libdand::test_support;
use libdand::{ProtectionConfig, Uid};

pub const SAMPLE_UID: [u8; 4] = [0x5A, 0x17, 0xC0, 0xDE];
pub const SAMPLE_UID7: [u8; 7] = [0x04, 0x8E, 0x21, 0x6A, 0x3B, 0x51, 0x80];

/// Address preloaded with 0x12345678 in ROM1
pub const ROM_WORD_ADDR: u32 = 0x0000_0100;
/// Type 2 tag area in RAM1
pub const T2T_BASE: u32 = RAM1_START + 0x40;

pub fn sample_uid() -> Uid {
    Uid::single(SAMPLE_UID)
}

/// ROM read-only, HW3 no access, NVM page 0 read-only, everything else
/// read/write
pub fn sample_protection() -> ProtectionConfig {
    let mut cfg = ProtectionConfig {
        prot_rom1: PROT_READ_ONLY,
        prot_rom2: PROT_READ_ONLY,
        prot_hw3: PROT_NO_ACCESS,
        ..Default::default()
    };
    cfg.nvm_prot_sect[0] = PROT_READ_ONLY;
    cfg
}

pub fn sample_config() -> TagConfig {
    let mut cfg = TagConfig::new(sample_uid())
        .with_sak(0x20)
        .with_protection(sample_protection());
    cfg.t2t_base = Some(T2T_BASE);
    cfg
}

/// Initialized tag over simulated memory with a few known values
pub fn sample_tag_with(config: TagConfig) -> Tag<Initialized> {
    let mut mem = test_support::simulated_memory();
    mem.load(ROM_WORD_ADDR, &[0x78, 0x56, 0x34, 0x12]);
    let t2t: Vec<u8> = (0u8..64).collect();
    mem.load(T2T_BASE, &t2t);
    test_support::initialized_tag_with(config, mem).expect("tag")
}

pub fn sample_tag() -> Tag<Initialized> {
    sample_tag_with(sample_config())
}

/// Sample tag already in PROT_DAND
pub fn prot_dand_tag_with(config: TagConfig) -> Tag<Initialized> {
    let mut tag = sample_tag_with(config);
    test_support::enter_prot_dand(&mut tag);
    tag
}

pub fn prot_dand_tag() -> Tag<Initialized> {
    prot_dand_tag_with(sample_config())
}

pub fn dand(command: DandCommand, payload: &[u8]) -> RawFrame {
    test_support::dand_frame(command, payload).expect("request fits")
}

pub fn addr(address: u32) -> [u8; 4] {
    address.to_be_bytes()
}

/// Send a Dandelion request and return the reply
pub fn exchange(
    tag: &mut Tag<Initialized>,
    command: DandCommand,
    payload: &[u8],
) -> DandelionResponse {
    tag.handle_frame(&dand(command, payload))
}

pub fn status_of(r: &DandelionResponse) -> Option<DandStatus> {
    r.status_code()
}
