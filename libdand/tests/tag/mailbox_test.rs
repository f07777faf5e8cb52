use std::sync::{Arc, Mutex};

use libdand::constants::*;
use libdand::mailbox::builtins::*;
use libdand::mailbox::message::{CALL_APP_FUNCTION, HAL_ACC_READ_W, HAL_ACC_WRITE_W};
use libdand::mailbox::Mailbox;
use libdand::peripherals::mock::{MockGpio, MockHBridge, MockSenseUnit, MockUart};
use libdand::peripherals::HBridgeSwitches;
use libdand::prelude::*;

use crate::common::{self, addr, exchange};

fn be(word: u32) -> [u8; 4] {
    word.to_be_bytes()
}

#[test]
fn builtin_mailbox_functions() {
    let mut tag = common::prot_dand_tag();
    let r = exchange(&mut tag, DandCommand::Call, &[FN_MAILBOX_ADDRESS]);
    assert_eq!(&r.payload()[1..], &be(DEFAULT_MAILBOX_BASE));
    let r = exchange(&mut tag, DandCommand::Call, &[FN_MAILBOX_SIZE]);
    assert_eq!(&r.payload()[1..], &be(MAILBOX_SIZE as u32));
    assert_eq!(
        tag.drain_notifications(),
        vec![
            Notification::FunctionCalled { id: FN_MAILBOX_ADDRESS },
            Notification::FunctionCalled { id: FN_MAILBOX_SIZE },
        ]
    );
}

#[test]
fn send_message_runs_function_on_mailbox() {
    let mut tag = common::prot_dand_tag();
    tag.register_function(0x30, |mb: &mut Mailbox| {
        let sum = mb.words()[1..4].iter().sum::<u32>();
        mb.set_word(10, sum);
        sum
    });
    let mut payload = vec![0x30];
    for w in [1u32, 2, 3] {
        payload.extend_from_slice(&be(w));
    }
    let r = exchange(&mut tag, DandCommand::SendMessage, &payload);
    assert_eq!(r.payload(), &[0x60, 0, 0, 0, 6]);
    assert_eq!(tag.mailbox().word(0), Some(0x30));
    assert_eq!(tag.mailbox().word(10), Some(6));

    // the result is readable through the mailbox window
    let r = exchange(&mut tag, DandCommand::ReadWord, &addr(DEFAULT_MAILBOX_BASE + 40));
    assert_eq!(r.payload(), &[0x80, 0, 0, 0, 6]);
}

#[test]
fn disabled_messages_do_not_touch_mailbox() {
    let mut cfg = common::sample_config();
    cfg.protection.message_disable = 0x0000_0000;
    let mut tag = common::prot_dand_tag_with(cfg);
    tag.register_function(0x30, |_: &mut Mailbox| 1);
    let r = exchange(&mut tag, DandCommand::SendMessage, &[0x30, 0, 0, 0, 9]);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorMessageCallDisabled));
    assert!(tag.mailbox().words().iter().all(|&w| w == 0));
    // call has its own gate
    let r = exchange(&mut tag, DandCommand::Call, &[0x30]);
    assert_eq!(r.status_code(), Some(DandStatus::AckCallFunc));
}

#[test]
fn disabled_calls() {
    let mut cfg = common::sample_config();
    cfg.protection.call_enabled = false;
    let mut tag = common::prot_dand_tag_with(cfg);
    let r = exchange(&mut tag, DandCommand::Call, &[FN_MAILBOX_SIZE]);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorMessageCallDisabled));
}

#[test]
fn unregistered_message_is_unknown_and_untouched() {
    let mut tag = common::prot_dand_tag();
    let r = exchange(&mut tag, DandCommand::SendMessage, &[0x77, 0, 0, 0, 1]);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorUnknownCmd));
    assert_eq!(tag.mailbox().word(0), Some(0));
}

#[test]
fn mailbox_window_writes_notify() {
    let mut tag = common::prot_dand_tag();
    let mut p = addr(DEFAULT_MAILBOX_BASE + 8).to_vec();
    p.extend_from_slice(&be(0xCAFE_F00D));
    exchange(&mut tag, DandCommand::WriteWord, &p);
    assert_eq!(tag.mailbox().word(2), Some(0xCAFE_F00D));
    assert_eq!(
        tag.drain_notifications(),
        vec![Notification::MailboxWritten { word: 2 }]
    );
    let r = exchange(&mut tag, DandCommand::Call, &[FN_PURGE_MAILBOX]);
    assert_eq!(r.status_code(), Some(DandStatus::AckCallFunc));
    assert_eq!(tag.mailbox().word(2), Some(0));
}

#[test]
fn bypassed_mailbox_window_uses_region_privilege() {
    let mut cfg = common::sample_config();
    cfg.protection.bypass_mailbox = BYPASS_MAILBOX;
    cfg.protection.prot_ram2 = PROT_READ_ONLY;
    let mut tag = common::prot_dand_tag_with(cfg);
    let mut p = addr(DEFAULT_MAILBOX_BASE).to_vec();
    p.extend_from_slice(&be(1));
    let r = exchange(&mut tag, DandCommand::WriteWord, &p);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorWriteProtected));
    assert_eq!(tag.mailbox().word(0), Some(0));
}

#[test]
fn notification_queue_overflow_drops_newest() {
    let mut cfg = common::sample_config();
    cfg.notify_capacity = 2;
    let mut tag = common::prot_dand_tag_with(cfg);
    for _ in 0..3 {
        exchange(&mut tag, DandCommand::Call, &[FN_MAILBOX_SIZE]);
    }
    assert_eq!(tag.drain_notifications().len(), 2);
}

#[test]
fn peripheral_functions_through_the_air() -> anyhow::Result<()> {
    let gpio = Arc::new(Mutex::new(MockGpio::new()));
    let mut tag = TagBuilder::new()
        .with_config(common::sample_config())
        .with_memory(Box::new(libdand::test_support::simulated_memory()))
        .with_gpio(gpio.clone())
        .with_sense_unit(MockSenseUnit {
            adc: (10, 20),
            rssi: 3,
            vcc_ca: 0x0700,
        })
        .build_uninitialized()?
        .initialize()?;
    libdand::test_support::enter_prot_dand(&mut tag);

    tag.mailbox_mut().set_word(1, 5);
    tag.mailbox_mut().set_word(2, 1);
    let r = exchange(&mut tag, DandCommand::Call, &[FN_GPIO_SET]);
    assert_eq!(&r.payload()[1..], &be(0x15));
    assert_eq!(gpio.lock().unwrap().levels.get(&5), Some(&1));

    let r = exchange(&mut tag, DandCommand::Call, &[FN_GPIO_GET]);
    assert_eq!(&r.payload()[1..], &be(0x1600_0001));

    let r = exchange(&mut tag, DandCommand::Call, &[FN_SENSE_ADC]);
    assert_eq!(&r.payload()[1..], &be(20 << 16 | 10));
    let r = exchange(&mut tag, DandCommand::Call, &[FN_SENSE_VCC_CA]);
    assert_eq!(&r.payload()[1..], &be(0x0700));
    Ok(())
}

/// Fill mailbox words 1.. through the mailbox window, as a reader would
fn post_words(tag: &mut Tag<Initialized>, words: &[u32]) {
    for (i, w) in words.iter().enumerate() {
        let mut p = addr(DEFAULT_MAILBOX_BASE + 4 * (i as u32 + 1)).to_vec();
        p.extend_from_slice(&be(*w));
        let r = exchange(tag, DandCommand::WriteWord, &p);
        assert_eq!(r.status_code(), Some(DandStatus::AckWriteWord));
    }
}

fn read_mailbox_word(tag: &mut Tag<Initialized>, index: u32) -> [u8; 4] {
    let r = exchange(tag, DandCommand::ReadWord, &addr(DEFAULT_MAILBOX_BASE + 4 * index));
    let mut w = [0u8; 4];
    w.copy_from_slice(&r.payload()[1..]);
    w
}

#[test]
fn mailbox_message_reads_memory_for_the_reader() {
    common::init_logger();
    let mut tag = common::prot_dand_tag();
    post_words(&mut tag, &[HAL_ACC_READ_W, common::ROM_WORD_ADDR]);
    let r = exchange(&mut tag, DandCommand::Call, &[FN_MAILBOX_MESSAGE]);
    assert_eq!(r.payload(), &[0x90, 0, 0, 0, 0]);
    assert_eq!(read_mailbox_word(&mut tag, 1), be(HAL_ACC_READ_W));
    assert_eq!(read_mailbox_word(&mut tag, 2), be(0x1234_5678));
}

#[test]
fn mailbox_message_write_to_read_only_region_fails() {
    let mut tag = common::prot_dand_tag();
    post_words(&mut tag, &[HAL_ACC_WRITE_W, common::ROM_WORD_ADDR, 0xFFFF_FFFF]);
    exchange(&mut tag, DandCommand::Call, &[FN_MAILBOX_MESSAGE]);
    assert_eq!(tag.mailbox().word(1), Some(0xA000_0011));
    assert_eq!(tag.mailbox().word(2), Some(common::ROM_WORD_ADDR));
    let r = exchange(&mut tag, DandCommand::ReadWord, &addr(common::ROM_WORD_ADDR));
    assert_eq!(r.payload(), &[0x80, 0x12, 0x34, 0x56, 0x78]);
}

#[test]
fn mailbox_message_calls_registered_function() {
    let mut tag = common::prot_dand_tag();
    post_words(&mut tag, &[CALL_APP_FUNCTION | u32::from(FN_MAILBOX_SIZE)]);
    exchange(&mut tag, DandCommand::Call, &[FN_MAILBOX_MESSAGE]);
    assert_eq!(tag.mailbox().word(1), Some(CALL_APP_FUNCTION | 1));
    assert_eq!(tag.mailbox().word(2), Some(MAILBOX_SIZE as u32));
}

#[test]
fn uart_and_hbridge_through_the_air() -> anyhow::Result<()> {
    let uart = Arc::new(Mutex::new(MockUart::default()));
    let hbridge = Arc::new(Mutex::new(MockHBridge::default()));
    let mut tag = TagBuilder::new()
        .with_config(common::sample_config())
        .with_memory(Box::new(libdand::test_support::simulated_memory()))
        .with_uart(uart.clone())
        .with_hbridge(hbridge.clone())
        .build_uninitialized()?
        .initialize()?;
    libdand::test_support::enter_prot_dand(&mut tag);

    tag.mailbox_mut().set_word(1, 9600);
    let r = exchange(&mut tag, DandCommand::Call, &[FN_UART_BAUDRATE]);
    assert_eq!(&r.payload()[1..], &be(0x4));
    assert_eq!(uart.lock().unwrap().baudrate, Some(9600));

    let r = exchange(&mut tag, DandCommand::SendMessage, &[FN_HBRIDGE, 0, 1, 1, 0]);
    assert_eq!(&r.payload()[1..], &be(0x5));
    assert_eq!(
        hbridge.lock().unwrap().history,
        vec![HBridgeSwitches {
            hs1: false,
            ls1: true,
            hs2: true,
            ls2: false
        }]
    );
    Ok(())
}
