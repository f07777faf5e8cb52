use std::sync::{Arc, Mutex};

use libdand::constants::*;
use libdand::mailbox::builtins::{FN_NVM_ERASE, FN_NVM_OPEN};
use libdand::memory::SimulatedMemory;
use libdand::peripherals::mock::MockNvm;
use libdand::prelude::*;

use crate::common;

#[test]
fn initialize_transitions_to_idle() {
    let tag = Tag::new(common::sample_config(), Box::new(SimulatedMemory::new())).unwrap();
    assert_eq!(tag.config().sak, 0x20);
    let tag = tag.initialize().unwrap();
    assert_eq!(tag.state(), TagState::Idle);
    assert_eq!(tag.function_ids(), vec![0, 1, 2, 15]);
}

#[test]
fn builder_requires_collaborators() {
    assert!(matches!(
        TagBuilder::new().build_uninitialized(),
        Err(Error::MissingCollaborator(_))
    ));
}

#[test]
fn builder_registers_peripheral_functions() -> anyhow::Result<()> {
    common::init_logger();
    let nvm = Arc::new(Mutex::new(MockNvm::new()));
    let mut tag = TagBuilder::new()
        .with_config(common::sample_config())
        .with_memory(Box::new(libdand::test_support::simulated_memory()))
        .with_nvm(nvm.clone())
        .build_uninitialized()?
        .initialize()?;
    assert!(tag.function_ids().contains(&FN_NVM_OPEN));

    libdand::test_support::enter_prot_dand(&mut tag);
    let r = common::exchange(&mut tag, DandCommand::Call, &[FN_NVM_ERASE]);
    assert_eq!(r.payload(), &[0x90, 0x11, 0x00, 0x00, 0x00]);
    assert_eq!(nvm.lock().unwrap().ops, vec!["erase".to_string()]);
    Ok(())
}

#[test]
fn tag_from_aparam_image() -> anyhow::Result<()> {
    let mut image = vec![0u8; APARAM_MIN_LEN];
    image[..7].copy_from_slice(&[0xF0, 0xF0, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
    image[0x58..0x5C].copy_from_slice(&MESSAGE_AND_CALL_ENABLE.to_le_bytes());
    for b in &mut image[APARAM_NVM_PROT_OFFSET..] {
        *b = PROT_READ_WRITE;
    }
    let protection = ProtectionConfig::from_aparams(&image)?;
    let cfg = TagConfig::new(common::sample_uid()).with_protection(protection);
    let mut tag = libdand::test_support::initialized_tag(cfg)?;
    libdand::test_support::enter_prot_dand(&mut tag);
    assert_eq!(tag.state(), TagState::ProtDand);

    let r = common::exchange(&mut tag, DandCommand::WriteWord, &[0, 0, 0x10, 0, 0, 0, 0, 1]);
    assert_eq!(r.status_code(), Some(DandStatus::ErrorWriteProtected));
    let r = common::exchange(&mut tag, DandCommand::ReadWord, &common::addr(HW3_START));
    assert_eq!(r.status_code(), Some(DandStatus::ErrorReadProtected));
    Ok(())
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut cfg = common::sample_config();
    cfg.protection.nvm_prot_sect.truncate(10);
    match Tag::new(cfg, Box::new(SimulatedMemory::new())) {
        Err(Error::InvalidConfig(msg)) => assert!(msg.contains("nvm_prot_sect")),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("config accepted"),
    }
}
