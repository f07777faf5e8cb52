// libdand/src/tag/config.rs

//! Identity, link parameters and protection of one tag.

use crate::constants::{DEFAULT_MAILBOX_BASE, SAK_CASCADE_BIT};
use crate::mailbox::notify::DEFAULT_NOTIFY_CAPACITY;
use crate::protection::ProtectionConfig;
use crate::types::Uid;
use crate::{Error, Result};

/// Identity and behaviour of a simulated tag
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagConfig {
    /// UID announced during anticollision
    pub uid: Uid,
    /// Answer to REQA/WUPA, sent LSB first
    pub atqa: [u8; 2],
    /// SAK sent once the UID is complete
    pub sak: u8,
    /// Start of the mailbox window, word aligned
    pub mailbox_base: u32,
    /// Type 2 tag data area. Falls back to the parameter block pointer.
    pub t2t_base: Option<u32>,
    /// Most notifications kept before new ones are dropped
    pub notify_capacity: usize,
    /// Privileges of the contactless interface
    pub protection: ProtectionConfig,
}

/// ATQA with the UID size bits matching `uid`
pub fn default_atqa(uid: &Uid) -> [u8; 2] {
    match uid.cascade_levels() {
        1 => [0x04, 0x00],
        2 => [0x44, 0x00],
        _ => [0x84, 0x00],
    }
}

impl TagConfig {
    /// Defaults for `uid`: matching ATQA, SAK 0, open protection
    pub fn new(uid: Uid) -> Self {
        Self {
            uid,
            atqa: default_atqa(&uid),
            sak: 0x00,
            mailbox_base: DEFAULT_MAILBOX_BASE,
            t2t_base: None,
            notify_capacity: DEFAULT_NOTIFY_CAPACITY,
            protection: ProtectionConfig::default(),
        }
    }

    /// Replace the protection config
    pub fn with_protection(mut self, protection: ProtectionConfig) -> Self {
        self.protection = protection;
        self
    }

    /// Final SAK; must not carry the cascade bit
    pub fn with_sak(mut self, sak: u8) -> Self {
        self.sak = sak;
        self
    }

    /// Reject values the tag cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sak & SAK_CASCADE_BIT != 0 {
            return Err(Error::InvalidConfig(format!(
                "final SAK {:#04x} has the cascade bit set",
                self.sak
            )));
        }
        if self.notify_capacity == 0 {
            return Err(Error::InvalidConfig("notify_capacity must be > 0".into()));
        }
        if self.mailbox_base % 4 != 0 {
            return Err(Error::InvalidConfig(format!(
                "mailbox base {:#010x} is not word aligned",
                self.mailbox_base
            )));
        }
        self.protection.validate()
    }

    /// Type 2 tag area in force
    pub fn effective_t2t_base(&self) -> Option<u32> {
        self.t2t_base.or_else(|| self.protection.tag_type_2_base())
    }
}
