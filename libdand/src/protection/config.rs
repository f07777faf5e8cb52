// libdand/src/protection/config.rs

//! Privilege configuration, normally loaded from the APARAM image.

use crate::constants::{
    APARAM_BYPASS_MAILBOX_OFFSET, APARAM_MESSAGE_DISABLE_OFFSET, APARAM_MIN_LEN,
    APARAM_NVM_PROT_OFFSET, APARAM_PROT_OFFSET, APARAM_T2T_PTR_OFFSET, BYPASS_MAILBOX,
    MESSAGE_AND_CALL_ENABLE, NVM_PROT_PAGES, PROT_READ_WRITE,
};
use crate::protocol::parser::{ensure_len, le_u32_at, slice_at};
use crate::Result;

/// Access configuration of the contactless interface, as programmed in the
/// application parameter block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtectionConfig {
    /// Privilege byte of ROM1, see `PROT_*`
    pub prot_rom1: u8,
    /// ROM2
    pub prot_rom2: u8,
    /// RAM1
    pub prot_ram1: u8,
    /// RAM2, mailbox window excepted
    pub prot_ram2: u8,
    /// HW1
    pub prot_hw1: u8,
    /// HW2
    pub prot_hw2: u8,
    /// HW3
    pub prot_hw3: u8,
    /// One privilege byte per NVM protection page
    pub nvm_prot_sect: Vec<u8>,
    /// `0xFFFF_FFFF` keeps send_message enabled
    pub message_disable: u32,
    /// `0xFCA1_FCB0` removes the always-accessible mailbox window
    pub bypass_mailbox: u32,
    /// Gate of the `call` command. Not part of the parameter block.
    pub call_enabled: bool,
    /// Address of the Type 2 tag area, zero when absent
    pub tag_type_2_ptr: u32,
}

impl Default for ProtectionConfig {
    /// Everything read/write, messages and calls enabled
    fn default() -> Self {
        Self {
            prot_rom1: PROT_READ_WRITE,
            prot_rom2: PROT_READ_WRITE,
            prot_ram1: PROT_READ_WRITE,
            prot_ram2: PROT_READ_WRITE,
            prot_hw1: PROT_READ_WRITE,
            prot_hw2: PROT_READ_WRITE,
            prot_hw3: PROT_READ_WRITE,
            nvm_prot_sect: vec![PROT_READ_WRITE; NVM_PROT_PAGES],
            message_disable: MESSAGE_AND_CALL_ENABLE,
            bypass_mailbox: 0,
            call_enabled: true,
            tag_type_2_ptr: 0,
        }
    }
}

impl ProtectionConfig {
    /// Parse an APARAM image. Multi-byte fields are little endian.
    pub fn from_aparams(image: &[u8]) -> Result<Self> {
        ensure_len(image, APARAM_MIN_LEN)?;
        let prot = slice_at(image, APARAM_PROT_OFFSET, 7)?;
        let cfg = Self {
            prot_rom1: prot[0],
            prot_rom2: prot[1],
            prot_ram1: prot[2],
            prot_ram2: prot[3],
            prot_hw1: prot[4],
            prot_hw2: prot[5],
            prot_hw3: prot[6],
            nvm_prot_sect: slice_at(image, APARAM_NVM_PROT_OFFSET, NVM_PROT_PAGES)?.to_vec(),
            message_disable: le_u32_at(image, APARAM_MESSAGE_DISABLE_OFFSET)?,
            bypass_mailbox: le_u32_at(image, APARAM_BYPASS_MAILBOX_OFFSET)?,
            call_enabled: true,
            tag_type_2_ptr: le_u32_at(image, APARAM_T2T_PTR_OFFSET)?,
        };
        log::debug!(
            "loaded protection config: message_disable={:#010x}, bypass_mailbox={:#010x}",
            cfg.message_disable,
            cfg.bypass_mailbox
        );
        Ok(cfg)
    }

    /// Reject tables that do not cover every NVM page.
    pub fn validate(&self) -> Result<()> {
        if self.nvm_prot_sect.len() != NVM_PROT_PAGES {
            return Err(crate::Error::InvalidConfig(format!(
                "nvm_prot_sect has {} entries, expected {}",
                self.nvm_prot_sect.len(),
                NVM_PROT_PAGES
            )));
        }
        Ok(())
    }

    /// Whether send_message is allowed
    pub fn message_enabled(&self) -> bool {
        self.message_disable == MESSAGE_AND_CALL_ENABLE
    }

    /// Whether the mailbox window loses its own privilege
    pub fn mailbox_bypassed(&self) -> bool {
        self.bypass_mailbox == BYPASS_MAILBOX
    }

    /// Type 2 tag area, `None` when the pointer is zero
    pub fn tag_type_2_base(&self) -> Option<u32> {
        (self.tag_type_2_ptr != 0).then_some(self.tag_type_2_ptr)
    }
}
