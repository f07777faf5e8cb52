// Drive a simulated Dandelion tag the way a reader would: wake it up,
// run anticollision, switch to the Dandelion protocol and then exchange
// a few register and function requests.
//
// Run with `RUST_LOG=libdand=trace cargo run --example simulated_reader`
// to see every frame the tag handles.

use libdand::constants::{DEFAULT_MAILBOX_BASE, RAM1_START, ROM1_START};
use libdand::mailbox::builtins::{FN_GPIO_GET, FN_MAILBOX_SIZE};
use libdand::peripherals::mock::{MockGpio, MockNvm, MockSenseUnit};
use libdand::prelude::*;
use libdand::protocol::verify_crc_a;
use libdand::test_support::{self, dand_frame};

fn exchange(tag: &mut Tag<Initialized>, label: &str, frame: &RawFrame) -> anyhow::Result<()> {
    let resp = tag.handle_frame(frame);
    if !resp.send_reply() {
        println!("{:<14} -> (silent)       state {}", label, tag.state());
        return Ok(());
    }
    let wire = resp.to_wire();
    if resp.append_checksum() {
        verify_crc_a(&wire)?;
    }
    println!("{:<14} -> {:<28} state {}", label, bytes_to_hex_spaced(&wire), tag.state());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let uid = Uid::try_from(parse_hex("5A17C0DE")?.as_slice())?;

    let mut memory = test_support::simulated_memory();
    memory.load(ROM1_START + 0x100, &[0x78, 0x56, 0x34, 0x12]);

    let mut protection = ProtectionConfig::default();
    protection.prot_rom1 = libdand::constants::PROT_READ_ONLY;

    let mut gpio = MockGpio::new();
    gpio.levels.insert(3, 1);

    let mut tag = TagBuilder::new()
        .with_config(TagConfig::new(uid).with_sak(0x20).with_protection(protection))
        .with_memory(Box::new(memory))
        .with_nvm(MockNvm::new())
        .with_gpio(gpio)
        .with_sense_unit(MockSenseUnit::default())
        .build_uninitialized()?
        .initialize()?;

    println!("UID {} registered functions {:?}", uid.to_hex(), tag.function_ids());

    exchange(&mut tag, "REQA", &test_support::reqa())?;
    if let Some(sel) = test_support::select(&uid, 1) {
        exchange(&mut tag, "SELECT CL1", &sel)?;
    }
    exchange(&mut tag, "RATS_DAND", &test_support::rats_dand())?;

    let rom_word = (ROM1_START + 0x100).to_be_bytes();
    exchange(&mut tag, "read_word", &dand_frame(DandCommand::ReadWord, &rom_word)?)?;

    let mut denied = rom_word.to_vec();
    denied.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    exchange(&mut tag, "write ROM", &dand_frame(DandCommand::WriteWord, &denied)?)?;

    let mut ram = RAM1_START.to_be_bytes().to_vec();
    ram.extend_from_slice(&[0xCA, 0xFE]);
    exchange(&mut tag, "write RAM", &dand_frame(DandCommand::WriteHalfWord, &ram)?)?;
    exchange(&mut tag, "read RAM", &dand_frame(DandCommand::ReadHalfWord, &RAM1_START.to_be_bytes())?)?;

    let mut mbox = DEFAULT_MAILBOX_BASE.to_be_bytes().to_vec();
    mbox.extend_from_slice(&3u32.to_be_bytes());
    exchange(&mut tag, "write mailbox", &dand_frame(DandCommand::WriteWord, &mbox)?)?;
    exchange(&mut tag, "call gpio_get", &dand_frame(DandCommand::Call, &[FN_GPIO_GET])?)?;
    exchange(&mut tag, "call size", &dand_frame(DandCommand::Call, &[FN_MAILBOX_SIZE])?)?;
    exchange(&mut tag, "call 0x7F", &dand_frame(DandCommand::Call, &[0x7F])?)?;
    exchange(&mut tag, "loopback", &dand_frame(DandCommand::Loopback, b"dand")?)?;
    exchange(&mut tag, "DESELECT", &test_support::deselect_dand())?;

    for n in tag.drain_notifications() {
        println!("notification: {}", n);
    }
    Ok(())
}
