// libdand/src/dispatch.rs

//! Dandelion command dispatcher.
//!
//! Interprets a decoded request against the memory protection layer, the
//! memory bus and the function registry, and composes exactly one status
//! reply. Every check runs before the first side effect.

use crate::mailbox::message::{self, MailboxRequest};
use crate::mailbox::{FunctionRegistry, Mailbox, Notification, NotificationQueue};
use crate::memory::MemoryBus;
use crate::protection::{AccessDecision, MemoryProtection};
use crate::protocol::parser::{be_u16_at, be_u32_at, byte_at};
use crate::protocol::{DandCommand, DandStatus, DandelionRequest, DandelionResponse};
use crate::types::{AccessIntent, AccessWidth};
use crate::{Error, Result};

/// Most message words a send_message request can carry
pub const MAX_MESSAGE_WORDS: usize = 11;

/// Bytes returned by a Type 2 tag READ
pub const T2T_READ_LEN: usize = 16;

/// Reply to a frame that failed CRC or parity verification
pub fn transport_error(crc_ok: bool, parity_ok: bool) -> DandelionResponse {
    if !parity_ok {
        DandelionResponse::status(DandStatus::ErrorRecCrcParity)
    } else if !crc_ok {
        DandelionResponse::status(DandStatus::ErrorRecCrc)
    } else {
        DandelionResponse::none()
    }
}

fn ack_for(command: DandCommand) -> DandStatus {
    match command {
        DandCommand::ReadWord => DandStatus::AckReadWord,
        DandCommand::ReadHalfWord => DandStatus::AckReadHalfWord,
        DandCommand::ReadByte => DandStatus::AckReadByte,
        DandCommand::WriteWord => DandStatus::AckWriteWord,
        DandCommand::WriteHalfWord => DandStatus::AckWriteHalfWord,
        DandCommand::WriteByte => DandStatus::AckWriteByte,
        DandCommand::Call => DandStatus::AckCallFunc,
        DandCommand::SendMessage => DandStatus::AckSendMsg,
        DandCommand::Loopback => DandStatus::RLoopback,
    }
}

/// Status reported for a capability rejection
fn rejection_status(e: &Error) -> DandStatus {
    match e {
        Error::MessageCallDisabled => DandStatus::ErrorMessageCallDisabled,
        _ => DandStatus::ErrorUnknownCmd,
    }
}

/// Value as transmitted: `width` bytes, most significant first
fn be_value(value: u32, width: AccessWidth) -> Vec<u8> {
    let b = value.to_be_bytes();
    b[4 - width.bytes()..].to_vec()
}

/// Executes Dandelion requests against protected memory and the
/// function registry. One per tag.
pub struct Dispatcher {
    protection: MemoryProtection,
    memory: Box<dyn MemoryBus>,
    mailbox: Mailbox,
    registry: FunctionRegistry,
    notifications: NotificationQueue,
    t2t_base: Option<u32>,
}

impl Dispatcher {
    /// The mailbox starts zeroed and the registry empty.
    pub fn new(
        protection: MemoryProtection,
        memory: Box<dyn MemoryBus>,
        notifications: NotificationQueue,
    ) -> Self {
        let t2t_base = protection.config().tag_type_2_base();
        Self {
            protection,
            memory,
            mailbox: Mailbox::new(),
            registry: FunctionRegistry::new(),
            notifications,
            t2t_base,
        }
    }

    /// Override the Type 2 tag data area
    pub fn set_t2t_base(&mut self, base: Option<u32>) {
        self.t2t_base = base;
    }

    /// Protection layer in use
    pub fn protection(&self) -> &MemoryProtection {
        &self.protection
    }

    /// Shared mailbox
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Mutable mailbox, for the application side
    pub fn mailbox_mut(&mut self) -> &mut Mailbox {
        &mut self.mailbox
    }

    /// Registered functions
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Registry, for adding functions
    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    /// Pending notifications
    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }

    /// Bypasses protection, as the CPU would
    pub fn memory_mut(&mut self) -> &mut dyn MemoryBus {
        &mut *self.memory
    }

    /// Handle one request and compose its reply.
    pub fn dispatch(&mut self, request: &DandelionRequest) -> DandelionResponse {
        let command = request.command();
        let payload = request.payload();
        if !command.accepts_payload_len(payload.len()) {
            log::warn!("{} with {} payload bytes rejected", command, payload.len());
            return DandelionResponse::status(DandStatus::ErrorUnknownCmd);
        }
        log::debug!("dispatching {}", command);

        let reply = match command {
            c if c.is_read() => self.read(c, payload),
            c if c.is_write() => self.write(c, payload),
            DandCommand::Call => self.call(payload),
            DandCommand::SendMessage => self.send_message(payload),
            _ => Ok(DandelionResponse::status_with(
                DandStatus::RLoopback,
                payload,
            )),
        };
        // payload lengths are checked above, so parser errors cannot occur
        reply.unwrap_or_else(|e| {
            log::warn!("{} failed to decode: {}", command, e);
            DandelionResponse::status(DandStatus::ErrorUnknownCmd)
        })
    }

    fn read(&mut self, command: DandCommand, payload: &[u8]) -> Result<DandelionResponse> {
        let width = match command.width() {
            Some(w) => w,
            None => return Ok(DandelionResponse::status(DandStatus::ErrorUnknownCmd)),
        };
        let address = be_u32_at(payload, 0)?;
        match self.protection.check(address, width, AccessIntent::Read) {
            AccessDecision::Misaligned => {
                log::warn!("{} at {:#010x} misaligned", command, address);
                return Ok(DandelionResponse::status(DandStatus::ErrorMisAligned));
            }
            AccessDecision::Denied(state) => {
                log::warn!("{} at {:#010x} denied ({:?})", command, address, state);
                return Ok(DandelionResponse::status(DandStatus::ErrorReadProtected));
            }
            AccessDecision::Granted => {}
        }
        match self.load(address, width) {
            Ok(value) => Ok(DandelionResponse::status_with(
                ack_for(command),
                &be_value(value, width),
            )),
            Err(e) => {
                log::warn!("{} at {:#010x}: {}", command, address, e);
                Ok(DandelionResponse::status(DandStatus::ErrorReadProtected))
            }
        }
    }

    fn write(&mut self, command: DandCommand, payload: &[u8]) -> Result<DandelionResponse> {
        let width = match command.width() {
            Some(w) => w,
            None => return Ok(DandelionResponse::status(DandStatus::ErrorUnknownCmd)),
        };
        let address = be_u32_at(payload, 0)?;
        let value = match width {
            AccessWidth::Byte => u32::from(byte_at(payload, 4)?),
            AccessWidth::HalfWord => u32::from(be_u16_at(payload, 4)?),
            AccessWidth::Word => be_u32_at(payload, 4)?,
        };
        match self.protection.check(address, width, AccessIntent::Write) {
            AccessDecision::Misaligned => {
                log::warn!("{} at {:#010x} misaligned", command, address);
                return Ok(DandelionResponse::status(DandStatus::ErrorMisAligned));
            }
            AccessDecision::Denied(state) => {
                log::warn!("{} at {:#010x} denied ({:?})", command, address, state);
                return Ok(DandelionResponse::status(DandStatus::ErrorWriteProtected));
            }
            AccessDecision::Granted => {}
        }
        match self.store(address, width, value) {
            Ok(()) => Ok(DandelionResponse::status(ack_for(command))),
            Err(e) => {
                log::warn!("{} at {:#010x}: {}", command, address, e);
                Ok(DandelionResponse::status(DandStatus::ErrorWriteProtected))
            }
        }
    }

    fn call(&mut self, payload: &[u8]) -> Result<DandelionResponse> {
        let id = byte_at(payload, 0)?;
        let outcome = if self.protection.config().call_enabled {
            self.run_function(id)
        } else {
            Err(Error::MessageCallDisabled)
        };
        match outcome {
            Ok(result) => {
                self.notifications.push(Notification::FunctionCalled { id });
                Ok(DandelionResponse::status_with(
                    DandStatus::AckCallFunc,
                    &result.to_be_bytes(),
                ))
            }
            Err(e) => {
                log::warn!("call {:#04x} rejected: {}", id, e);
                Ok(DandelionResponse::status(rejection_status(&e)))
            }
        }
    }

    /// Registered-id and gate checks of send_message; nothing is touched
    /// unless both pass.
    fn admit_message(&self, id: u8) -> Result<()> {
        if !self.protection.config().message_enabled() {
            return Err(Error::MessageCallDisabled);
        }
        if !self.registry.is_registered(id) {
            return Err(Error::FunctionNotRegistered(id));
        }
        Ok(())
    }

    fn send_message(&mut self, payload: &[u8]) -> Result<DandelionResponse> {
        let id = byte_at(payload, 0)?;
        if let Err(e) = self.admit_message(id) {
            log::warn!("message {:#04x} rejected: {}", id, e);
            return Ok(DandelionResponse::status(rejection_status(&e)));
        }
        let words = payload[1..]
            .chunks_exact(4)
            .map(|c| be_u32_at(c, 0))
            .collect::<Result<Vec<u32>>>()?;

        self.mailbox.set_word(0, u32::from(id));
        for (i, w) in words.iter().take(MAX_MESSAGE_WORDS).enumerate() {
            self.mailbox.set_word(i + 1, *w);
        }
        self.notifications
            .push(Notification::MessageReceived { id });
        let result = self.run_function(id)?;
        Ok(DandelionResponse::status_with(
            DandStatus::AckSendMsg,
            &result.to_be_bytes(),
        ))
    }

    /// Run function `id`; the mailbox message processor needs the memory
    /// path and so is handled here rather than by the registry.
    fn run_function(&mut self, id: u8) -> Result<u32> {
        if self.registry.is_mailbox_message(id) {
            self.process_mailbox_message();
            return Ok(0);
        }
        self.registry.invoke(id, &mut self.mailbox)
    }

    /// Execute the request held in the mailbox and store its outcome there.
    /// Accesses go through the same protection checks as frame commands.
    fn process_mailbox_message(&mut self) {
        let request = match MailboxRequest::decode(&self.mailbox) {
            Some(r) => r,
            None => {
                log::warn!(
                    "unknown mailbox command {:#010x}",
                    self.mailbox.word(message::COMMAND_WORD).unwrap_or(0)
                );
                return;
            }
        };
        log::debug!("mailbox message {:?}", request);
        let outcome = match request {
            MailboxRequest::Access {
                intent: AccessIntent::Read,
                width,
                address,
                ..
            } => self.checked_load(address, width).map_err(|e| (e, address)),
            MailboxRequest::Access {
                intent: AccessIntent::Write,
                width,
                address,
                value,
            } => self
                .checked_store(address, width, value)
                .map(|_| value)
                .map_err(|e| (e, address)),
            MailboxRequest::CallApp { id } => self
                .registry
                .invoke(id, &mut self.mailbox)
                .map_err(|e| (e, u32::from(id))),
        };
        let (code, value) = match outcome {
            Ok(v) => (request.ack_code(), v),
            Err((e, detail)) => {
                log::warn!("mailbox message failed: {}", e);
                (request.error_code(), detail)
            }
        };
        message::read_suffix(code, value, &mut self.mailbox);
    }

    fn admit(&self, address: u32, width: AccessWidth, intent: AccessIntent) -> Result<()> {
        if self.protection.check(address, width, intent).is_granted() {
            Ok(())
        } else {
            let intent = match intent {
                AccessIntent::Read => "read",
                AccessIntent::Write => "write",
            };
            Err(Error::AccessDenied { address, intent })
        }
    }

    fn checked_load(&mut self, address: u32, width: AccessWidth) -> Result<u32> {
        self.admit(address, width, AccessIntent::Read)?;
        self.load(address, width)
    }

    fn checked_store(&mut self, address: u32, width: AccessWidth, value: u32) -> Result<()> {
        self.admit(address, width, AccessIntent::Write)?;
        self.store(address, width, value)
    }

    /// Type 2 tag READ of four blocks starting at `block`. Returns no reply
    /// when no tag area is configured or any byte is unreadable.
    pub fn read_t2t(&mut self, block: u8) -> DandelionResponse {
        let base = match self.t2t_base {
            Some(b) => b,
            None => return DandelionResponse::none(),
        };
        let start = base.wrapping_add(4 * u32::from(block));
        let mut data = [0u8; T2T_READ_LEN];
        for (i, slot) in data.iter_mut().enumerate() {
            let address = start.wrapping_add(i as u32);
            match self.checked_load(address, AccessWidth::Byte) {
                Ok(v) => *slot = v as u8,
                Err(e) => {
                    log::warn!("t2t read of block {} stopped: {}", block, e);
                    return DandelionResponse::none();
                }
            }
        }
        DandelionResponse::with_bytes(&data, true).unwrap_or_default()
    }

    fn load(&mut self, address: u32, width: AccessWidth) -> Result<u32> {
        if self.protection.in_mailbox_window(address) {
            let offset = address - self.protection.mailbox_base();
            return self
                .mailbox
                .read(offset, width)
                .ok_or(Error::BusFault { address });
        }
        match width {
            AccessWidth::Byte => self.memory.read_u8(address).map(u32::from),
            AccessWidth::HalfWord => self.memory.read_u16(address).map(u32::from),
            AccessWidth::Word => self.memory.read_u32(address),
        }
    }

    fn store(&mut self, address: u32, width: AccessWidth, value: u32) -> Result<()> {
        if self.protection.in_mailbox_window(address) {
            let offset = address - self.protection.mailbox_base();
            let word = self
                .mailbox
                .write(offset, width, value)
                .ok_or(Error::BusFault { address })?;
            self.notifications
                .push(Notification::MailboxWritten { word });
            return Ok(());
        }
        match width {
            AccessWidth::Byte => self.memory.write_u8(address, value as u8),
            AccessWidth::HalfWord => self.memory.write_u16(address, value as u16),
            AccessWidth::Word => self.memory.write_u32(address, value),
        }
    }
}
