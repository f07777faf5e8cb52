// libdand/src/mailbox/notify.rs

//! Events raised for the application while frames are handled.

use std::collections::VecDeque;

/// Default number of pending notifications
pub const DEFAULT_NOTIFY_CAPACITY: usize = 16;

/// Events raised by the dispatcher for the application to pick up
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Notification {
    /// send_message filled the mailbox and ran function `id`
    #[display(fmt = "message {:#04x} received", id)]
    MessageReceived {
        /// Function id of the message
        id: u8,
    },
    /// The reader wrote through the mailbox window
    #[display(fmt = "mailbox word {} written", word)]
    MailboxWritten {
        /// Index of the word touched
        word: usize,
    },
    /// A call ran function `id`
    #[display(fmt = "function {:#04x} called", id)]
    FunctionCalled {
        /// Function id called
        id: u8,
    },
}

/// Bounded FIFO. When full, new entries are dropped.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NOTIFY_CAPACITY)
    }
}

impl NotificationQueue {
    /// Empty queue holding at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns false if the queue was full and `n` was dropped.
    pub fn push(&mut self, n: Notification) -> bool {
        if self.items.len() >= self.capacity {
            log::warn!("notification queue full, dropping: {}", n);
            return false;
        }
        self.items.push_back(n);
        true
    }

    /// Remove and return all entries, oldest first
    pub fn drain(&mut self) -> Vec<Notification> {
        self.items.drain(..).collect()
    }

    /// Drop all pending entries
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of pending entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Most entries held at once
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
