// libdand/src/peripherals/mod.rs

//! Narrow interfaces to the chip peripherals reachable through mailbox
//! functions. Drivers live outside this crate.

pub mod mock;

use std::sync::{Arc, Mutex};

use crate::{Error, Result};

/// Non-volatile memory page programming
pub trait Nvm: Send {
    /// Map the page holding `address` into the assembly buffer
    fn open_assembly_buffer(&mut self, address: u32) -> Result<()>;
    /// Program the open page; returns the controller status (0 = success)
    fn program_page(&mut self) -> Result<u8>;
    /// Erase the open page; returns the controller status
    fn erase_page(&mut self) -> Result<u8>;
    /// Power the controller up
    fn switch_on(&mut self) -> Result<()>;
    /// Power it down
    fn switch_off(&mut self) -> Result<()>;
    /// Return to the default read configuration
    fn normal_read(&mut self) -> Result<()>;
}

/// Pad configuration of a single GPIO, unpacked from a mailbox word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpioConfig {
    /// Pad number
    pub pin: u8,
    /// Drive the pad
    pub output_enable: bool,
    /// Sample the pad
    pub input_enable: bool,
    /// Weak pull-up
    pub pull_up: bool,
    /// Weak pull-down
    pub pull_down: bool,
    /// Drive low only
    pub open_drain: bool,
}

impl GpioConfig {
    /// Pin in bits 0..8, flags in bits 8..13
    pub fn from_word(word: u32) -> Self {
        let bit = |n: u32| (word >> n) & 1 == 1;
        Self {
            pin: word as u8,
            output_enable: bit(8),
            input_enable: bit(9),
            pull_up: bit(10),
            pull_down: bit(11),
            open_drain: bit(12),
        }
    }
}

/// General purpose pins
pub trait Gpio: Send {
    /// Drive `pin` to `level` (0 or 1)
    fn set_output(&mut self, pin: u8, level: u8) -> Result<()>;
    /// Sampled level of `pin`
    fn get_input(&mut self, pin: u8) -> Result<u8>;
    /// Returns the resulting pad configuration byte
    fn configure(&mut self, config: GpioConfig) -> Result<u8>;
}

/// Analog measurements of the sense unit
pub trait SenseUnit: Send {
    /// One sample of both ADC channels
    fn sample_adc(&mut self) -> Result<(u16, u16)>;
    /// Received signal strength
    fn rssi(&mut self) -> Result<u32>;
    /// Rectified antenna supply
    fn vcc_ca(&mut self) -> Result<u32>;
}

/// Serial port of the chip
pub trait Uart: Send {
    /// Reconfigure the line speed
    fn set_baudrate(&mut self, baudrate: u32) -> Result<()>;
}

/// Switch pattern of the two H-bridge half bridges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HBridgeSwitches {
    /// High side of bridge 1
    pub hs1: bool,
    /// Low side of bridge 1
    pub ls1: bool,
    /// High side of bridge 2
    pub hs2: bool,
    /// Low side of bridge 2
    pub ls2: bool,
}

impl HBridgeSwitches {
    /// `hs1` in bit 24, `ls1` in bit 16, `hs2` in bit 8, `ls2` in bit 0
    pub fn from_word(word: u32) -> Self {
        let bit = |n: u32| (word >> n) & 1 == 1;
        Self {
            hs1: bit(24),
            ls1: bit(16),
            hs2: bit(8),
            ls2: bit(0),
        }
    }
}

/// Motor driver made of two half bridges
pub trait HBridge: Send {
    /// Apply `switches` at once
    fn set_switches(&mut self, switches: HBridgeSwitches) -> Result<()>;
}

macro_rules! forward_through_box {
    ($tr:ident { $(fn $name:ident(&mut self $(, $arg:ident: $ty:ty)*) -> $ret:ty;)* }) => {
        impl<T: $tr + ?Sized> $tr for Box<T> {
            $(fn $name(&mut self $(, $arg: $ty)*) -> $ret {
                (**self).$name($($arg),*)
            })*
        }

        /// Shared handle, so the caller can keep inspecting the peripheral
        impl<T: $tr> $tr for Arc<Mutex<T>> {
            $(fn $name(&mut self $(, $arg: $ty)*) -> $ret {
                self.lock()
                    .map_err(|_| Error::Peripheral(concat!(stringify!($tr), " lock poisoned").into()))?
                    .$name($($arg),*)
            })*
        }
    };
}

forward_through_box!(Nvm {
    fn open_assembly_buffer(&mut self, address: u32) -> Result<()>;
    fn program_page(&mut self) -> Result<u8>;
    fn erase_page(&mut self) -> Result<u8>;
    fn switch_on(&mut self) -> Result<()>;
    fn switch_off(&mut self) -> Result<()>;
    fn normal_read(&mut self) -> Result<()>;
});

forward_through_box!(Gpio {
    fn set_output(&mut self, pin: u8, level: u8) -> Result<()>;
    fn get_input(&mut self, pin: u8) -> Result<u8>;
    fn configure(&mut self, config: GpioConfig) -> Result<u8>;
});

forward_through_box!(SenseUnit {
    fn sample_adc(&mut self) -> Result<(u16, u16)>;
    fn rssi(&mut self) -> Result<u32>;
    fn vcc_ca(&mut self) -> Result<u32>;
});

forward_through_box!(Uart {
    fn set_baudrate(&mut self, baudrate: u32) -> Result<()>;
});

forward_through_box!(HBridge {
    fn set_switches(&mut self, switches: HBridgeSwitches) -> Result<()>;
});
