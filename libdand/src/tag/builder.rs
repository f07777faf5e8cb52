// libdand/src/tag/builder.rs

//! Builder for [`Tag`](super::Tag).

use std::sync::{Arc, Mutex};

use crate::memory::MemoryBus;
use crate::peripherals::{Gpio, HBridge, Nvm, SenseUnit, Uart};
use crate::tag::config::TagConfig;
use crate::tag::handle::{Peripherals, Tag, Uninitialized};
use crate::{Error, Result};

/// Helper to construct a Tag with optional peripherals.
#[derive(Default)]
pub struct TagBuilder {
    config: Option<TagConfig>,
    memory: Option<Box<dyn MemoryBus>>,
    peripherals: Peripherals,
}

impl TagBuilder {
    /// Empty builder; config and memory are required
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity and protection (required)
    pub fn with_config(mut self, config: TagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Memory bus backing reads and writes (required)
    pub fn with_memory(mut self, memory: Box<dyn MemoryBus>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Registers the NVM functions
    pub fn with_nvm<N: Nvm + 'static>(mut self, nvm: N) -> Self {
        self.peripherals.nvm = Some(Arc::new(Mutex::new(nvm)));
        self
    }

    /// Registers the GPIO functions
    pub fn with_gpio<G: Gpio + 'static>(mut self, gpio: G) -> Self {
        self.peripherals.gpio = Some(Arc::new(Mutex::new(gpio)));
        self
    }

    /// Registers the ADC, RSSI and VCC_CA functions
    pub fn with_sense_unit<S: SenseUnit + 'static>(mut self, sense: S) -> Self {
        self.peripherals.sense = Some(Arc::new(Mutex::new(sense)));
        self
    }

    /// Registers the baudrate function
    pub fn with_uart<U: Uart + 'static>(mut self, uart: U) -> Self {
        self.peripherals.uart = Some(Arc::new(Mutex::new(uart)));
        self
    }

    /// H-bridge driven by the switch function
    pub fn with_hbridge<H: HBridge + 'static>(mut self, hbridge: H) -> Self {
        self.peripherals.hbridge = Some(Arc::new(Mutex::new(hbridge)));
        self
    }

    /// Consume the builder and return an uninitialized Tag.
    pub fn build_uninitialized(self) -> Result<Tag<Uninitialized>> {
        let config = self.config.ok_or(Error::MissingCollaborator("tag config"))?;
        let memory = self.memory.ok_or(Error::MissingCollaborator("memory bus"))?;
        Tag::with_peripherals(config, memory, self.peripherals)
    }
}
