// libdand/src/mailbox/mod.rs

//! Shared word array used to pass arguments and results to mailbox
//! functions, plus the registry of those functions.

pub mod builtins;
pub mod message;
pub mod notify;
pub mod registry;

pub use message::MailboxRequest;
pub use notify::{Notification, NotificationQueue};
pub use registry::{FunctionRegistry, MailboxFunction};

use crate::constants::MAILBOX_SIZE;
use crate::types::AccessWidth;

/// Size of the mailbox in bytes
pub const MAILBOX_BYTES: u32 = (MAILBOX_SIZE * 4) as u32;

/// Word array shared between the reader and mailbox functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    words: [u32; MAILBOX_SIZE],
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    /// Zeroed mailbox
    pub fn new() -> Self {
        Self {
            words: [0u32; MAILBOX_SIZE],
        }
    }

    /// Word `index`, if in range
    pub fn word(&self, index: usize) -> Option<u32> {
        self.words.get(index).copied()
    }

    /// Returns false when `index` is outside the mailbox.
    pub fn set_word(&mut self, index: usize, value: u32) -> bool {
        match self.words.get_mut(index) {
            Some(w) => {
                *w = value;
                true
            }
            None => false,
        }
    }

    /// All words
    pub fn words(&self) -> &[u32; MAILBOX_SIZE] {
        &self.words
    }

    /// All words, mutable
    pub fn words_mut(&mut self) -> &mut [u32; MAILBOX_SIZE] {
        &mut self.words
    }

    /// Zero every word
    pub fn purge(&mut self) {
        self.words = [0u32; MAILBOX_SIZE];
    }

    /// Read `width` bytes at byte `offset`, laid out little endian as in
    /// the CPU's memory. The offset must be aligned and in range.
    pub fn read(&self, offset: u32, width: AccessWidth) -> Option<u32> {
        if offset >= MAILBOX_BYTES || !width.is_aligned(offset) {
            return None;
        }
        let word = self.words[(offset / 4) as usize];
        let shift = (offset % 4) * 8;
        let mask = match width {
            AccessWidth::Byte => 0xFF,
            AccessWidth::HalfWord => 0xFFFF,
            AccessWidth::Word => 0xFFFF_FFFF,
        };
        Some((word >> shift) & mask)
    }

    /// Write counterpart of `read`; returns the index of the touched word.
    pub fn write(&mut self, offset: u32, width: AccessWidth, value: u32) -> Option<usize> {
        if offset >= MAILBOX_BYTES || !width.is_aligned(offset) {
            return None;
        }
        let index = (offset / 4) as usize;
        let shift = (offset % 4) * 8;
        let mask: u32 = match width {
            AccessWidth::Byte => 0xFF,
            AccessWidth::HalfWord => 0xFFFF,
            AccessWidth::Word => 0xFFFF_FFFF,
        };
        let w = &mut self.words[index];
        *w = (*w & !(mask << shift)) | ((value & mask) << shift);
        Some(index)
    }
}
