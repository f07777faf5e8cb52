// libdand/src/protection/mod.rs

//! Address legality and access privileges of the contactless interface.
//!
//! `MemoryProtection` is a pure query over an immutable `ProtectionConfig`:
//! it maps an address to its hardware region or NVM page and decides whether
//! an access of a given width and intent is allowed.

pub mod config;

pub use config::ProtectionConfig;

use crate::constants::*;
use crate::types::{AccessIntent, AccessState, AccessWidth};

/// Hardware regions of the address map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Region {
    /// Boot ROM
    #[display(fmt = "ROM1")]
    Rom1,
    /// Library ROM
    #[display(fmt = "ROM2")]
    Rom2,
    /// Data RAM
    #[display(fmt = "RAM1")]
    Ram1,
    /// Application RAM
    #[display(fmt = "RAM2")]
    Ram2,
    /// Peripheral registers
    #[display(fmt = "HW1")]
    Hw1,
    /// Peripheral registers
    #[display(fmt = "HW2")]
    Hw2,
    /// System registers
    #[display(fmt = "HW3")]
    Hw3,
    /// NVM read window, protected per page
    #[display(fmt = "NVM")]
    Nvm,
}

impl Region {
    /// Regions protected by a single privilege byte
    pub const HARDWARE: [Region; 7] = [
        Region::Rom1,
        Region::Rom2,
        Region::Ram1,
        Region::Ram2,
        Region::Hw1,
        Region::Hw2,
        Region::Hw3,
    ];

    /// Closed-open address range `[start, stop)`
    pub fn range(&self) -> (u32, u32) {
        match self {
            Region::Rom1 => (ROM1_START, ROM1_STOP),
            Region::Rom2 => (ROM2_START, ROM2_STOP),
            Region::Ram1 => (RAM1_START, RAM1_STOP),
            Region::Ram2 => (RAM2_START, RAM2_STOP),
            Region::Hw1 => (HW1_START, HW1_STOP),
            Region::Hw2 => (HW2_START, HW2_STOP),
            Region::Hw3 => (HW3_START, HW3_STOP),
            Region::Nvm => (NVM_BASE, NVM_STOP),
        }
    }

    /// Whether `address` falls in this region
    pub fn contains(&self, address: u32) -> bool {
        let (start, stop) = self.range();
        address >= start && address < stop
    }
}

/// Outcome of an address check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The access may proceed
    Granted,
    /// The privilege in force does not permit the intent
    Denied(AccessState),
    /// Address not a multiple of the access width
    Misaligned,
}

impl AccessDecision {
    /// True for `Granted`
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

/// Index of the NVM protection page holding `address`
pub fn nvm_page(address: u32) -> Option<usize> {
    Region::Nvm
        .contains(address)
        .then(|| ((address - NVM_BASE) / NVM_PROT_PAGE_SIZE) as usize)
}

/// Privilege checks over one configuration and mailbox location
#[derive(Debug, Clone)]
pub struct MemoryProtection {
    config: ProtectionConfig,
    mailbox_base: u32,
}

impl MemoryProtection {
    /// Checks against `config`, mailbox window at `mailbox_base`
    pub fn new(config: ProtectionConfig, mailbox_base: u32) -> Self {
        Self {
            config,
            mailbox_base,
        }
    }

    /// Configuration in force
    pub fn config(&self) -> &ProtectionConfig {
        &self.config
    }

    /// First byte of the mailbox window
    pub fn mailbox_base(&self) -> u32 {
        self.mailbox_base
    }

    /// Region owning `address`, NVM included
    pub fn region_of(&self, address: u32) -> Option<Region> {
        Region::HARDWARE
            .iter()
            .chain(std::iter::once(&Region::Nvm))
            .copied()
            .find(|r| r.contains(address))
    }

    /// Whether `address` lies in the mailbox window and the window is active
    pub fn in_mailbox_window(&self, address: u32) -> bool {
        let size = (MAILBOX_SIZE * 4) as u32;
        !self.config.mailbox_bypassed()
            && address >= self.mailbox_base
            && address - self.mailbox_base < size
    }

    /// Privilege in force at `address`. Unmapped addresses have no access.
    pub fn privilege(&self, address: u32) -> AccessState {
        if self.in_mailbox_window(address) {
            return AccessState::ReadWrite;
        }
        let byte = match self.region_of(address) {
            Some(Region::Rom1) => self.config.prot_rom1,
            Some(Region::Rom2) => self.config.prot_rom2,
            Some(Region::Ram1) => self.config.prot_ram1,
            Some(Region::Ram2) => self.config.prot_ram2,
            Some(Region::Hw1) => self.config.prot_hw1,
            Some(Region::Hw2) => self.config.prot_hw2,
            Some(Region::Hw3) => self.config.prot_hw3,
            Some(Region::Nvm) => nvm_page(address)
                .and_then(|p| self.config.nvm_prot_sect.get(p).copied())
                .unwrap_or(PROT_NO_ACCESS),
            None => PROT_NO_ACCESS,
        };
        AccessState::from_privilege(byte)
    }

    /// Decide on an access. Alignment is checked before privilege.
    pub fn check(&self, address: u32, width: AccessWidth, intent: AccessIntent) -> AccessDecision {
        if !width.is_aligned(address) {
            return AccessDecision::Misaligned;
        }
        let state = self.privilege(address);
        if state.permits(intent) {
            AccessDecision::Granted
        } else {
            AccessDecision::Denied(state)
        }
    }
}
