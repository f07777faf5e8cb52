use libdand::protocol::crc::{append_crc_a, check_crc_a, crc_a_bytes, odd_parity, verify_crc_a};

#[test]
fn crc_a_reference_frames() {
    // frames as captured from a reader
    for line in ["500057cd", "e050bca5", "0000a01e"] {
        let frame = hex::decode(line).unwrap();
        assert!(check_crc_a(&frame), "{}", line);
        verify_crc_a(&frame).unwrap();
    }
}

#[test]
fn crc_a_detects_single_bit_flips() {
    let mut frame = vec![0x01, 0x80, 0x20, 0x00, 0x1F, 0x00];
    append_crc_a(&mut frame);
    for i in 0..frame.len() * 8 {
        let mut f = frame.clone();
        f[i / 8] ^= 1 << (i % 8);
        assert!(!check_crc_a(&f), "bit {} flip undetected", i);
    }
}

#[test]
fn crc_bytes_are_lsb_first() {
    assert_eq!(crc_a_bytes(&[0x50, 0x00]), [0x57, 0xCD]);
}

#[test]
fn parity_makes_odd_count() {
    for b in 0u8..=255 {
        let ones = b.count_ones() + u32::from(odd_parity(b));
        assert_eq!(ones % 2, 1);
    }
}
