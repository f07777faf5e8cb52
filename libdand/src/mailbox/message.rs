// libdand/src/mailbox/message.rs

//! Requests carried inside the mailbox.
//!
//! A reader that cannot afford one frame per access fills the mailbox with
//! a request and then calls the mailbox message function. Word 1 holds the
//! command, word 2 the address (or nothing for an application call) and
//! word 3 the value to write. The outcome replaces words 1 and 2.

use super::Mailbox;
use crate::types::{AccessIntent, AccessWidth};

/// Write a word
pub const HAL_ACC_WRITE_W: u32 = 0x1100_0000;
/// Write a half-word
pub const HAL_ACC_WRITE_HW: u32 = 0x1200_0000;
/// Write a byte
pub const HAL_ACC_WRITE_B: u32 = 0x1300_0000;
/// Read a word
pub const HAL_ACC_READ_W: u32 = 0x1400_0000;
/// Read a half-word
pub const HAL_ACC_READ_HW: u32 = 0x1500_0000;
/// Read a byte
pub const HAL_ACC_READ_B: u32 = 0x1600_0000;

/// Application function id in the low byte
pub const CALL_APP_FUNCTION: u32 = 0x6000_0000;
/// Application call failed
pub const CALL_APP_FUNCTION_ERROR: u32 = 0x60A0_0000;

/// Failed accesses report `HAL_ACC_ERROR | opcode byte`
pub const HAL_ACC_ERROR: u32 = 0xA000_0000;

/// Word holding the command
pub const COMMAND_WORD: usize = 1;
/// Word holding the address; receives the result value
pub const ADDRESS_WORD: usize = 2;
/// Word holding the value to write
pub const VALUE_WORD: usize = 3;

/// A decoded mailbox request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxRequest {
    /// Read or write of tag memory
    Access {
        /// Read or write
        intent: AccessIntent,
        /// Access size
        width: AccessWidth,
        /// Target address
        address: u32,
        /// Truncated to `width`; zero for reads
        value: u32,
    },
    /// Call of a registered function on the mailbox
    CallApp {
        /// Function id
        id: u8,
    },
}

impl MailboxRequest {
    /// Decode the request in `mailbox`; `None` for an unknown command.
    pub fn decode(mailbox: &Mailbox) -> Option<Self> {
        let command = mailbox.word(COMMAND_WORD)?;
        let address = mailbox.word(ADDRESS_WORD).unwrap_or(0);
        let value = mailbox.word(VALUE_WORD).unwrap_or(0);
        let access = |intent, width: AccessWidth| {
            let value = match (intent, width) {
                (AccessIntent::Read, _) => 0,
                (_, AccessWidth::Byte) => value & 0xFF,
                (_, AccessWidth::HalfWord) => value & 0xFFFF,
                (_, AccessWidth::Word) => value,
            };
            Some(MailboxRequest::Access {
                intent,
                width,
                address,
                value,
            })
        };
        match command & 0xFF00_0000 {
            HAL_ACC_WRITE_W => access(AccessIntent::Write, AccessWidth::Word),
            HAL_ACC_WRITE_HW => access(AccessIntent::Write, AccessWidth::HalfWord),
            HAL_ACC_WRITE_B => access(AccessIntent::Write, AccessWidth::Byte),
            HAL_ACC_READ_W => access(AccessIntent::Read, AccessWidth::Word),
            HAL_ACC_READ_HW => access(AccessIntent::Read, AccessWidth::HalfWord),
            HAL_ACC_READ_B => access(AccessIntent::Read, AccessWidth::Byte),
            CALL_APP_FUNCTION => Some(MailboxRequest::CallApp { id: command as u8 }),
            _ => None,
        }
    }

    /// Code stored in the command word on success
    pub fn ack_code(&self) -> u32 {
        match *self {
            MailboxRequest::Access { .. } => opcode(self),
            MailboxRequest::CallApp { id } => CALL_APP_FUNCTION | u32::from(id),
        }
    }

    /// Code stored in the command word on failure
    pub fn error_code(&self) -> u32 {
        match *self {
            MailboxRequest::Access { .. } => HAL_ACC_ERROR | (opcode(self) >> 24),
            MailboxRequest::CallApp { .. } => CALL_APP_FUNCTION_ERROR,
        }
    }
}

fn opcode(request: &MailboxRequest) -> u32 {
    match *request {
        MailboxRequest::Access { intent, width, .. } => match (intent, width) {
            (AccessIntent::Read, AccessWidth::Word) => HAL_ACC_READ_W,
            (AccessIntent::Read, AccessWidth::HalfWord) => HAL_ACC_READ_HW,
            (AccessIntent::Read, AccessWidth::Byte) => HAL_ACC_READ_B,
            (_, AccessWidth::Word) => HAL_ACC_WRITE_W,
            (_, AccessWidth::HalfWord) => HAL_ACC_WRITE_HW,
            (_, AccessWidth::Byte) => HAL_ACC_WRITE_B,
        },
        MailboxRequest::CallApp { .. } => CALL_APP_FUNCTION,
    }
}

/// Store the outcome of a request: `code` in the command word, `value`
/// in the address word.
pub fn read_suffix(code: u32, value: u32, mailbox: &mut Mailbox) {
    mailbox.set_word(COMMAND_WORD, code);
    mailbox.set_word(ADDRESS_WORD, value);
}
