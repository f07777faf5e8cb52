use proptest::prelude::*;

use libdand::constants::*;
use libdand::prelude::*;
use libdand::protection::Region;

use crate::common::{self, exchange};

fn mapped(address: u32) -> bool {
    Region::HARDWARE.iter().any(|r| r.contains(address)) || Region::Nvm.contains(address)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn loopback_echoes_any_payload(payload in prop::collection::vec(any::<u8>(), 0..TX_BUFFER_SIZE)) {
        let mut tag = common::prot_dand_tag();
        let r = exchange(&mut tag, DandCommand::Loopback, &payload);
        prop_assert_eq!(r.status_code(), Some(DandStatus::RLoopback));
        prop_assert_eq!(&r.payload()[1..], payload.as_slice());
    }

    #[test]
    fn misaligned_wide_access_is_rejected(address in any::<u32>(), word in any::<bool>(), write in any::<bool>()) {
        let (command, width) = match (word, write) {
            (true, false) => (DandCommand::ReadWord, 4),
            (false, false) => (DandCommand::ReadHalfWord, 2),
            (true, true) => (DandCommand::WriteWord, 4),
            (false, true) => (DandCommand::WriteHalfWord, 2),
        };
        prop_assume!(address % width != 0);
        let mut payload = address.to_be_bytes().to_vec();
        if write {
            payload.extend(std::iter::repeat(0xA5).take(width as usize));
        }
        let mut tag = common::prot_dand_tag();
        let r = exchange(&mut tag, command, &payload);
        prop_assert_eq!(r.status_code(), Some(DandStatus::ErrorMisAligned));
    }

    #[test]
    fn unmapped_addresses_are_protected(address in any::<u32>()) {
        prop_assume!(!mapped(address));
        let aligned = address & !3;
        prop_assume!(!mapped(aligned));
        let mut tag = common::prot_dand_tag();
        let r = exchange(&mut tag, DandCommand::ReadWord, &aligned.to_be_bytes());
        prop_assert_eq!(r.status_code(), Some(DandStatus::ErrorReadProtected));
        let mut p = aligned.to_be_bytes().to_vec();
        p.push(0);
        let r = exchange(&mut tag, DandCommand::WriteByte, &p);
        prop_assert_eq!(r.status_code(), Some(DandStatus::ErrorWriteProtected));
    }

    #[test]
    fn arbitrary_frames_never_panic(frames in prop::collection::vec(
        (prop::collection::vec(any::<u8>(), 0..16), 0usize..140), 1..12)) {
        use std::panic::{catch_unwind, AssertUnwindSafe};
        let mut tag = common::sample_tag();
        let res = catch_unwind(AssertUnwindSafe(|| {
            libdand::test_support::enter_prot_dand(&mut tag);
            for (data, bits) in &frames {
                let raw = RawFrame::bits(data, *bits);
                let r = tag.handle_frame(&raw);
                assert!(r.bit_length() <= TX_BUFFER_SIZE * 8);
            }
        }));
        prop_assert!(res.is_ok());
    }

    #[test]
    fn replies_carry_one_status(address in any::<u32>(), value in any::<u8>()) {
        let mut tag = common::prot_dand_tag();
        let mut p = address.to_be_bytes().to_vec();
        p.push(value);
        let r = exchange(&mut tag, DandCommand::WriteByte, &p);
        prop_assert!(r.send_reply());
        prop_assert_eq!(r.payload().len(), 1);
        prop_assert!(r.status_code().is_some());
    }
}
