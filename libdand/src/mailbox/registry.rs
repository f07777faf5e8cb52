// libdand/src/mailbox/registry.rs

//! Function registry keyed by 8-bit id.

use std::collections::HashMap;
use std::fmt;

use super::Mailbox;
use crate::{Error, Result};

/// A function reachable through `call` and `send_message`. It receives the
/// shared mailbox and returns the 32-bit result sent back to the reader.
pub trait MailboxFunction: Send {
    /// Run once per call or message
    fn call(&mut self, mailbox: &mut Mailbox) -> u32;
}

impl<F> MailboxFunction for F
where
    F: FnMut(&mut Mailbox) -> u32 + Send,
{
    fn call(&mut self, mailbox: &mut Mailbox) -> u32 {
        self(mailbox)
    }
}

enum Entry {
    Function(Box<dyn MailboxFunction>),
    /// Executes the request held in the mailbox. Needs tag memory, so the
    /// dispatcher runs it instead of the registry.
    MailboxMessage,
}

/// Sparse table from 8-bit ids to mailbox functions
#[derive(Default)]
pub struct FunctionRegistry {
    entries: HashMap<u8, Entry>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl FunctionRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `function` under `id`. A previous entry is replaced.
    pub fn register<F>(&mut self, id: u8, function: F)
    where
        F: MailboxFunction + 'static,
    {
        self.insert(id, Entry::Function(Box::new(function)));
    }

    /// Mark `id` as the mailbox message processor.
    pub fn register_mailbox_message(&mut self, id: u8) {
        self.insert(id, Entry::MailboxMessage);
    }

    fn insert(&mut self, id: u8, entry: Entry) {
        if self.entries.insert(id, entry).is_some() {
            log::debug!("function {:#04x} replaced", id);
        }
    }

    /// Whether anything is stored under `id`
    pub fn is_registered(&self, id: u8) -> bool {
        self.entries.contains_key(&id)
    }

    /// True when `id` names the mailbox message processor
    pub fn is_mailbox_message(&self, id: u8) -> bool {
        matches!(self.entries.get(&id), Some(Entry::MailboxMessage))
    }

    /// Registered ids in ascending order
    pub fn ids(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Run the function stored under `id` on `mailbox`.
    ///
    /// The mailbox message processor is not callable from here and yields
    /// [`Error::NotCallable`].
    pub fn invoke(&mut self, id: u8, mailbox: &mut Mailbox) -> Result<u32> {
        match self.entries.get_mut(&id) {
            Some(Entry::Function(function)) => Ok(function.call(mailbox)),
            Some(Entry::MailboxMessage) => Err(Error::NotCallable(id)),
            None => Err(Error::FunctionNotRegistered(id)),
        }
    }
}
