// libdand/src/peripherals/mock.rs

//! In-memory peripherals for tests and demos.

use std::collections::HashMap;

use super::{Gpio, GpioConfig, HBridge, HBridgeSwitches, Nvm, SenseUnit, Uart};
use crate::{Error, Result};

/// Records every NVM operation; `status` is returned by program/erase.
#[derive(Debug, Default)]
pub struct MockNvm {
    /// Operations in call order
    pub ops: Vec<String>,
    /// Address given to the last open
    pub open_page: Option<u32>,
    /// Switched on
    pub powered: bool,
    /// Controller status returned by program and erase
    pub status: u8,
    /// Make every operation fail
    pub fail: bool,
}

impl MockNvm {
    /// Idle controller, status 0
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, op: String) -> Result<()> {
        if self.fail {
            return Err(Error::Peripheral(format!("nvm {} failed", op)));
        }
        self.ops.push(op);
        Ok(())
    }
}

impl Nvm for MockNvm {
    fn open_assembly_buffer(&mut self, address: u32) -> Result<()> {
        self.record(format!("open {:#010x}", address))?;
        self.open_page = Some(address);
        Ok(())
    }

    fn program_page(&mut self) -> Result<u8> {
        self.record("program".into())?;
        Ok(self.status)
    }

    fn erase_page(&mut self) -> Result<u8> {
        self.record("erase".into())?;
        Ok(self.status)
    }

    fn switch_on(&mut self) -> Result<()> {
        self.record("on".into())?;
        self.powered = true;
        Ok(())
    }

    fn switch_off(&mut self) -> Result<()> {
        self.record("off".into())?;
        self.powered = false;
        Ok(())
    }

    fn normal_read(&mut self) -> Result<()> {
        self.record("normal_read".into())
    }
}

/// GPIO bank backed by a map of pin levels
#[derive(Debug, Default)]
pub struct MockGpio {
    /// Level per pin; inputs read back outputs
    pub levels: HashMap<u8, u8>,
    /// Every configuration applied
    pub configs: Vec<GpioConfig>,
}

impl MockGpio {
    /// All pins low
    pub fn new() -> Self {
        Self::default()
    }
}

impl Gpio for MockGpio {
    fn set_output(&mut self, pin: u8, level: u8) -> Result<()> {
        self.levels.insert(pin, level);
        Ok(())
    }

    fn get_input(&mut self, pin: u8) -> Result<u8> {
        Ok(self.levels.get(&pin).copied().unwrap_or(0))
    }

    fn configure(&mut self, config: GpioConfig) -> Result<u8> {
        self.configs.push(config);
        Ok(config.pin)
    }
}

/// Sense unit returning fixed readings
#[derive(Debug, Clone, Default)]
pub struct MockSenseUnit {
    /// Returned by `sample_adc`
    pub adc: (u16, u16),
    /// Returned by `rssi`
    pub rssi: u32,
    /// Returned by `vcc_ca`
    pub vcc_ca: u32,
}

impl SenseUnit for MockSenseUnit {
    fn sample_adc(&mut self) -> Result<(u16, u16)> {
        Ok(self.adc)
    }

    fn rssi(&mut self) -> Result<u32> {
        Ok(self.rssi)
    }

    fn vcc_ca(&mut self) -> Result<u32> {
        Ok(self.vcc_ca)
    }
}

/// UART that remembers the last baudrate; zero is rejected
#[derive(Debug, Default)]
pub struct MockUart {
    /// Last accepted baudrate
    pub baudrate: Option<u32>,
}

impl Uart for MockUart {
    fn set_baudrate(&mut self, baudrate: u32) -> Result<()> {
        if baudrate == 0 {
            return Err(Error::Peripheral("uart baudrate 0".into()));
        }
        self.baudrate = Some(baudrate);
        Ok(())
    }
}

/// H-bridge recording every switch pattern applied
#[derive(Debug, Default)]
pub struct MockHBridge {
    /// Patterns in the order applied
    pub history: Vec<HBridgeSwitches>,
}

impl HBridge for MockHBridge {
    fn set_switches(&mut self, switches: HBridgeSwitches) -> Result<()> {
        self.history.push(switches);
        Ok(())
    }
}
