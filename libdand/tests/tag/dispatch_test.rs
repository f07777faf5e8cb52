use libdand::constants::*;
use libdand::prelude::*;
use libdand::test_support::reader_frame;

use crate::common::{self, addr, exchange};

#[test]
fn write_byte_to_read_only_rom_is_rejected() {
    common::init_logger();
    let mut tag = common::prot_dand_tag();
    let mut payload = addr(common::ROM_WORD_ADDR).to_vec();
    payload.push(0xEE);
    let r = exchange(&mut tag, DandCommand::WriteByte, &payload);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorWriteProtected));
    assert_eq!(r.payload().len(), 1);
    assert_eq!(tag.memory_mut().read_u8(common::ROM_WORD_ADDR).unwrap(), 0x78);
}

#[test]
fn unregistered_call_is_unknown_command() {
    let mut tag = common::prot_dand_tag();
    let r = exchange(&mut tag, DandCommand::Call, &[0xFF]);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorUnknownCmd));
    assert!(tag.drain_notifications().is_empty());
}

#[test]
fn crc_error_in_prot_dand_keeps_state() {
    let mut tag = common::prot_dand_tag();
    let mut wire = reader_frame(&[NFC_DAND_CMD, 0x80, 0, 0, 1, 0]).data().to_vec();
    let last = wire.len() - 1;
    wire[last] ^= 0x40;
    let r = tag.handle_frame(&RawFrame::standard(&wire));
    assert_eq!(r.status_code(), Some(DandStatus::ErrorRecCrc));
    assert_eq!(r.to_wire().len(), 3);
    assert_eq!(tag.state(), TagState::ProtDand);
}

#[test]
fn parity_error_in_prot_dand() {
    let mut tag = common::prot_dand_tag();
    let raw = reader_frame(&[NFC_DAND_CMD, 0xFF, 0x01]);
    let mut parity = raw.parity().to_vec();
    parity[2] = !parity[2];
    let r = tag.handle_frame(&RawFrame::new(raw.data().to_vec(), raw.bit_len(), parity));
    assert_eq!(r.status_code(), Some(DandStatus::ErrorRecCrcParity));
    assert_eq!(tag.state(), TagState::ProtDand);
}

#[test]
fn loopback_round_trip() {
    let mut tag = common::prot_dand_tag();
    let r = exchange(&mut tag, DandCommand::Loopback, b"dandelion");
    assert_eq!(r.status_code(), Some(DandStatus::RLoopback));
    assert_eq!(&r.payload()[1..], b"dandelion");
}

#[test]
fn repeated_read_word_is_identical() {
    let mut tag = common::prot_dand_tag();
    let a = exchange(&mut tag, DandCommand::ReadWord, &addr(common::ROM_WORD_ADDR));
    let b = exchange(&mut tag, DandCommand::ReadWord, &addr(common::ROM_WORD_ADDR));
    assert_eq!(a.to_wire(), b.to_wire());
    assert_eq!(a.payload(), &[0x80, 0x12, 0x34, 0x56, 0x78]);
}

#[test]
fn misaligned_access_wins_over_privilege() {
    let mut tag = common::prot_dand_tag();
    let r = exchange(&mut tag, DandCommand::ReadWord, &addr(HW3_START + 2));
    assert_eq!(r.status_code(), Some(DandStatus::ErrorMisAligned));
    let r = exchange(&mut tag, DandCommand::WriteHalfWord, &[0x20, 0, 0, 3, 0xAB, 0xCD]);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorMisAligned));
    // nothing reached the bus
    assert_eq!(tag.memory_mut().read_u8(0x2000_0003).unwrap(), 0);
}

#[test]
fn write_and_read_each_width() {
    let mut tag = common::prot_dand_tag();
    let a = addr(RAM2_START + 0x20);
    let mut w = a.to_vec();
    w.extend_from_slice(&[0xA1, 0xB2, 0xC3, 0xD4]);
    assert_eq!(
        exchange(&mut tag, DandCommand::WriteWord, &w).status_code(),
        Some(DandStatus::AckWriteWord)
    );
    let mut h = addr(RAM2_START + 0x22).to_vec();
    h.extend_from_slice(&[0x00, 0x11]);
    assert_eq!(
        exchange(&mut tag, DandCommand::WriteHalfWord, &h).status_code(),
        Some(DandStatus::AckWriteHalfWord)
    );
    let r = exchange(&mut tag, DandCommand::ReadWord, &a);
    assert_eq!(r.payload(), &[0x80, 0x00, 0x11, 0xC3, 0xD4]);
    let r = exchange(&mut tag, DandCommand::ReadByte, &addr(RAM2_START + 0x20));
    assert_eq!(r.payload(), &[0x82, 0xD4]);
}

#[test]
fn nvm_pages_follow_their_own_table() {
    let mut tag = common::prot_dand_tag();
    let mut p = addr(NVM_BASE).to_vec();
    p.push(1);
    let r = exchange(&mut tag, DandCommand::WriteByte, &p);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorWriteProtected));
    let mut p = addr(NVM_BASE + NVM_PROT_PAGE_SIZE).to_vec();
    p.push(1);
    let r = exchange(&mut tag, DandCommand::WriteByte, &p);
    assert_eq!(r.status_code(), Some(DandStatus::AckWriteByte));
}

#[test]
fn bad_payload_length_is_unknown_command() {
    let mut tag = common::prot_dand_tag();
    let r = exchange(&mut tag, DandCommand::ReadWord, &[0x20, 0x00]);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorUnknownCmd));
    let r = exchange(&mut tag, DandCommand::SendMessage, &[1, 2, 3]);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorUnknownCmd));
}

#[test]
fn link_commands_are_unknown_in_prot_dand() {
    let mut tag = common::prot_dand_tag();
    let r = tag.handle_frame(&reader_frame(&[NFC_T2T_READ, 0]));
    assert_eq!(r.status_code(), Some(DandStatus::ErrorUnknownCmd));
    let r = tag.handle_frame(&RawFrame::short(NFC_WUPA));
    assert_eq!(r.status_code(), Some(DandStatus::ErrorUnknownCmd));
    assert_eq!(tag.state(), TagState::ProtDand);
}

/// Bus implementing only byte accesses over four RAM1 bytes; the upper two
/// are not writable.
struct HalfWritableBus {
    cells: [u8; 4],
}

impl HalfWritableBus {
    fn offset(address: u32) -> libdand::Result<usize> {
        match address.checked_sub(RAM1_START) {
            Some(o) if o < 4 => Ok(o as usize),
            _ => Err(Error::BusFault { address }),
        }
    }
}

impl MemoryBus for HalfWritableBus {
    fn read_u8(&mut self, address: u32) -> libdand::Result<u8> {
        Ok(self.cells[Self::offset(address)?])
    }

    fn write_u8(&mut self, address: u32, value: u8) -> libdand::Result<()> {
        self.check_range(address, 1)?;
        self.cells[Self::offset(address)?] = value;
        Ok(())
    }

    fn check_range(&self, address: u32, len: u32) -> libdand::Result<()> {
        for a in address..address.saturating_add(len) {
            if Self::offset(a)? >= 2 {
                return Err(Error::BusFault { address: a });
            }
        }
        Ok(())
    }
}

#[test]
fn faulting_word_write_leaves_byte_bus_untouched() {
    let bus = HalfWritableBus { cells: [0; 4] };
    let mut tag = Tag::new(common::sample_config(), Box::new(bus))
        .and_then(|t| t.initialize())
        .expect("tag");
    libdand::test_support::enter_prot_dand(&mut tag);
    assert_eq!(tag.state(), TagState::ProtDand);

    let mut payload = addr(RAM1_START).to_vec();
    payload.extend_from_slice(&0xDEAD_BEEFu32.to_be_bytes());
    let r = exchange(&mut tag, DandCommand::WriteWord, &payload);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorWriteProtected));
    for i in 0..4 {
        assert_eq!(tag.memory_mut().read_u8(RAM1_START + i).unwrap(), 0);
    }

    let mut payload = addr(RAM1_START).to_vec();
    payload.extend_from_slice(&0xBEEFu16.to_be_bytes());
    let r = exchange(&mut tag, DandCommand::WriteHalfWord, &payload);
    assert_eq!(r.status_code(), Some(DandStatus::AckWriteHalfWord));
    assert_eq!(tag.memory_mut().read_u16(RAM1_START).unwrap(), 0xBEEF);
}
