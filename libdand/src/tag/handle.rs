// libdand/src/tag/handle.rs

//! Type-state tag handle.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use crate::dispatch::Dispatcher;
use crate::link::{LinkStateMachine, TagState};
use crate::mailbox::{builtins, Mailbox, MailboxFunction, Notification, NotificationQueue};
use crate::memory::MemoryBus;
use crate::peripherals::{Gpio, HBridge, Nvm, SenseUnit, Uart};
use crate::protection::MemoryProtection;
use crate::protocol::{DandelionResponse, Frame, RawFrame};
use crate::tag::config::TagConfig;
use crate::Result;

/// Type-state marker: built, built-ins not registered yet
pub struct Uninitialized;
/// Ready to handle frames
pub struct Initialized;

/// Peripherals whose functions are registered at initialization
#[derive(Default)]
pub(crate) struct Peripherals {
    pub nvm: Option<Arc<Mutex<dyn Nvm>>>,
    pub gpio: Option<Arc<Mutex<dyn Gpio>>>,
    pub sense: Option<Arc<Mutex<dyn SenseUnit>>>,
    pub uart: Option<Arc<Mutex<dyn Uart>>>,
    pub hbridge: Option<Arc<Mutex<dyn HBridge>>>,
}

/// Tag handle that only accepts frames once initialized.
pub struct Tag<State = Uninitialized> {
    config: TagConfig,
    link: LinkStateMachine,
    dispatcher: Dispatcher,
    peripherals: Peripherals,
    _state: PhantomData<State>,
}

impl Tag<Uninitialized> {
    /// Create a tag over `memory`. The configuration is validated here.
    pub fn new(config: TagConfig, memory: Box<dyn MemoryBus>) -> Result<Self> {
        Self::with_peripherals(config, memory, Peripherals::default())
    }

    pub(crate) fn with_peripherals(
        config: TagConfig,
        memory: Box<dyn MemoryBus>,
        peripherals: Peripherals,
    ) -> Result<Self> {
        config.validate()?;
        let protection = MemoryProtection::new(config.protection.clone(), config.mailbox_base);
        let mut dispatcher = Dispatcher::new(
            protection,
            memory,
            NotificationQueue::with_capacity(config.notify_capacity),
        );
        dispatcher.set_t2t_base(config.effective_t2t_base());
        let link = LinkStateMachine::new(config.uid, config.atqa, config.sak);
        Ok(Self {
            config,
            link,
            dispatcher,
            peripherals,
            _state: PhantomData,
        })
    }

    /// Register the built-in functions and reset the link to Idle.
    pub fn initialize(self) -> Result<Tag<Initialized>> {
        let mut this = self;
        let registry = this.dispatcher.registry_mut();
        builtins::register_mailbox_functions(registry, this.config.mailbox_base);
        if let Some(nvm) = this.peripherals.nvm.clone() {
            builtins::register_nvm_functions(registry, nvm);
        }
        if let Some(gpio) = this.peripherals.gpio.clone() {
            builtins::register_gpio_functions(registry, gpio);
        }
        if let Some(sense) = this.peripherals.sense.clone() {
            builtins::register_sense_functions(registry, sense);
        }
        if let Some(uart) = this.peripherals.uart.clone() {
            builtins::register_uart_functions(registry, uart);
        }
        if let Some(hbridge) = this.peripherals.hbridge.clone() {
            builtins::register_hbridge_functions(registry, hbridge);
        }
        this.link.field_lost();
        log::debug!(
            "tag {} initialized, functions {:?}",
            this.config.uid.to_hex(),
            this.dispatcher.registry().ids()
        );

        Ok(Tag {
            config: this.config,
            link: this.link,
            dispatcher: this.dispatcher,
            peripherals: this.peripherals,
            _state: PhantomData,
        })
    }

    /// Configuration the tag was built with
    pub fn config(&self) -> &TagConfig {
        &self.config
    }
}

impl Tag<Initialized> {
    /// Classify a received bit stream and process it.
    pub fn handle_frame(&mut self, raw: &RawFrame) -> DandelionResponse {
        let frame = Frame::classify(raw);
        self.handle_classified(&frame)
    }

    /// Process a frame classified by the caller
    pub fn handle_classified(&mut self, frame: &Frame) -> DandelionResponse {
        self.link.handle(frame, &mut self.dispatcher)
    }

    /// RF field lost: state returns to Idle and pending notifications are
    /// discarded. Mailbox contents survive.
    pub fn field_lost(&mut self) {
        self.link.field_lost();
        self.dispatcher.notifications_mut().clear();
    }

    /// Register (or replace) a mailbox function
    pub fn register_function<F>(&mut self, id: u8, function: F)
    where
        F: MailboxFunction + 'static,
    {
        self.dispatcher.registry_mut().register(id, function);
    }

    /// Ids currently registered, ascending
    pub fn function_ids(&self) -> Vec<u8> {
        self.dispatcher.registry().ids()
    }

    /// Take the pending notifications, oldest first
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.dispatcher.notifications_mut().drain()
    }

    /// Current link state
    pub fn state(&self) -> TagState {
        self.link.state()
    }

    /// Mailbox as the application sees it
    pub fn mailbox(&self) -> &Mailbox {
        self.dispatcher.mailbox()
    }

    /// Mailbox, writable by the application
    pub fn mailbox_mut(&mut self) -> &mut Mailbox {
        self.dispatcher.mailbox_mut()
    }

    /// Memory without protection checks
    pub fn memory_mut(&mut self) -> &mut dyn MemoryBus {
        self.dispatcher.memory_mut()
    }

    /// Configuration in force
    pub fn config(&self) -> &TagConfig {
        &self.config
    }
}
