// libdand/src/mailbox/builtins.rs

//! Functions registered at initialization. They are ordinary registry
//! entries: a later `register` under the same id replaces them.

use std::sync::{Arc, Mutex};

use super::{FunctionRegistry, Mailbox};
use crate::constants::MAILBOX_SIZE;
use crate::peripherals::{Gpio, GpioConfig, HBridge, HBridgeSwitches, Nvm, SenseUnit, Uart};
use crate::Result;

/// Returns the mailbox base address
pub const FN_MAILBOX_ADDRESS: u8 = 0;
/// Returns the mailbox size in words
pub const FN_MAILBOX_SIZE: u8 = 1;
/// Zeroes the mailbox
pub const FN_PURGE_MAILBOX: u8 = 2;
/// Opens the NVM page holding the address in word 1
pub const FN_NVM_OPEN: u8 = 3;
/// Programs the open page
pub const FN_NVM_PROGRAM: u8 = 4;
/// Erases the open page
pub const FN_NVM_ERASE: u8 = 5;
/// Powers the NVM up
pub const FN_NVM_SWITCH_ON: u8 = 6;
/// Powers the NVM down
pub const FN_NVM_SWITCH_OFF: u8 = 7;
/// Restores the default NVM read mode
pub const FN_NVM_NORMAL_READ: u8 = 8;
/// Drives pin word 1 to level word 2
pub const FN_GPIO_SET: u8 = 9;
/// Reads pin word 1
pub const FN_GPIO_GET: u8 = 10;
/// Configures a pad from word 1, see [`GpioConfig::from_word`]
pub const FN_GPIO_CONFIG: u8 = 11;
/// Both ADC channels, second in the high half
pub const FN_SENSE_ADC: u8 = 12;
/// Received signal strength
pub const FN_SENSE_RSSI: u8 = 13;
/// Supply voltage at the antenna
pub const FN_SENSE_VCC_CA: u8 = 14;
/// Executes the request held in the mailbox, see [`super::message`]
pub const FN_MAILBOX_MESSAGE: u8 = 15;
/// Sets the UART baudrate from word 1
pub const FN_UART_BAUDRATE: u8 = 16;
/// Applies the H-bridge switch pattern in word 1
pub const FN_HBRIDGE: u8 = 17;

/// Result returned when a peripheral call fails
pub const PERIPHERAL_FAULT: u32 = 0xFFFF_FFFF;

const RC_NVM_ERASE: u32 = 0x1100_0000;
const RC_NVM_SWITCH_ON: u32 = 0x13;
const RC_NVM_SWITCH_OFF: u32 = 0x14;
const RC_NVM_OPEN: u32 = 0x14;
const RC_NVM_NORMAL_READ: u32 = 0x09;
const RC_GPIO_SET: u32 = 0x15;
const RC_GPIO_GET: u32 = 0x1600_0000;
const RC_GPIO_CONFIG: u32 = 0x1700_0000;
const RC_UART_BAUDRATE: u32 = 0x4;
const RC_HBRIDGE: u32 = 0x5;

fn arg(mb: &Mailbox, index: usize) -> u32 {
    mb.word(index).unwrap_or(0)
}

/// Run `f` on the locked peripheral, mapping any failure to `PERIPHERAL_FAULT`.
fn with<P: ?Sized, F>(p: &Mutex<P>, what: &str, f: F) -> u32
where
    F: FnOnce(&mut P) -> Result<u32>,
{
    let mut guard = match p.lock() {
        Ok(g) => g,
        Err(_) => {
            log::warn!("{}: peripheral lock poisoned", what);
            return PERIPHERAL_FAULT;
        }
    };
    match f(&mut *guard) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{} failed: {}", what, e);
            PERIPHERAL_FAULT
        }
    }
}

/// Mailbox address, size, purge and the mailbox message processor
pub fn register_mailbox_functions(registry: &mut FunctionRegistry, mailbox_base: u32) {
    registry.register_mailbox_message(FN_MAILBOX_MESSAGE);
    registry.register(FN_MAILBOX_ADDRESS, move |_: &mut Mailbox| mailbox_base);
    registry.register(FN_MAILBOX_SIZE, |_: &mut Mailbox| MAILBOX_SIZE as u32);
    registry.register(FN_PURGE_MAILBOX, |mb: &mut Mailbox| {
        mb.purge();
        0
    });
}

/// Ids 3..=8
pub fn register_nvm_functions(registry: &mut FunctionRegistry, nvm: Arc<Mutex<dyn Nvm>>) {
    let n = nvm.clone();
    registry.register(FN_NVM_OPEN, move |mb: &mut Mailbox| {
        let address = arg(mb, 1);
        with(&*n, "nvm open", |p| p.open_assembly_buffer(address).map(|_| RC_NVM_OPEN))
    });
    let n = nvm.clone();
    registry.register(FN_NVM_PROGRAM, move |_: &mut Mailbox| {
        with(&*n, "nvm program", |p| p.program_page().map(u32::from))
    });
    let n = nvm.clone();
    registry.register(FN_NVM_ERASE, move |_: &mut Mailbox| {
        with(&*n, "nvm erase", |p| {
            p.erase_page().map(|s| RC_NVM_ERASE | u32::from(s))
        })
    });
    let n = nvm.clone();
    registry.register(FN_NVM_SWITCH_ON, move |_: &mut Mailbox| {
        with(&*n, "nvm switch on", |p| p.switch_on().map(|_| RC_NVM_SWITCH_ON))
    });
    let n = nvm.clone();
    registry.register(FN_NVM_SWITCH_OFF, move |_: &mut Mailbox| {
        with(&*n, "nvm switch off", |p| p.switch_off().map(|_| RC_NVM_SWITCH_OFF))
    });
    registry.register(FN_NVM_NORMAL_READ, move |_: &mut Mailbox| {
        with(&*nvm, "nvm normal read", |p| p.normal_read().map(|_| RC_NVM_NORMAL_READ))
    });
}

/// Ids 9..=11
pub fn register_gpio_functions(registry: &mut FunctionRegistry, gpio: Arc<Mutex<dyn Gpio>>) {
    let g = gpio.clone();
    registry.register(FN_GPIO_SET, move |mb: &mut Mailbox| {
        let (pin, level) = (arg(mb, 1) as u8, arg(mb, 2) as u8);
        with(&*g, "gpio set", |p| p.set_output(pin, level).map(|_| RC_GPIO_SET))
    });
    let g = gpio.clone();
    registry.register(FN_GPIO_GET, move |mb: &mut Mailbox| {
        let pin = arg(mb, 1) as u8;
        with(&*g, "gpio get", |p| {
            p.get_input(pin).map(|l| RC_GPIO_GET | u32::from(l))
        })
    });
    registry.register(FN_GPIO_CONFIG, move |mb: &mut Mailbox| {
        let cfg = GpioConfig::from_word(arg(mb, 1));
        with(&*gpio, "gpio configure", |p| {
            p.configure(cfg).map(|b| RC_GPIO_CONFIG | u32::from(b))
        })
    });
}

/// Ids 12..=14
pub fn register_sense_functions(registry: &mut FunctionRegistry, sense: Arc<Mutex<dyn SenseUnit>>) {
    let s = sense.clone();
    registry.register(FN_SENSE_ADC, move |_: &mut Mailbox| {
        with(&*s, "adc sample", |p| {
            p.sample_adc()
                .map(|(a, b)| u32::from(a) | (u32::from(b) << 16))
        })
    });
    let s = sense.clone();
    registry.register(FN_SENSE_RSSI, move |_: &mut Mailbox| {
        with(&*s, "rssi", |p| p.rssi())
    });
    registry.register(FN_SENSE_VCC_CA, move |_: &mut Mailbox| {
        with(&*sense, "vcc_ca", |p| p.vcc_ca())
    });
}

/// Baudrate in word 1
pub fn register_uart_functions(registry: &mut FunctionRegistry, uart: Arc<Mutex<dyn Uart>>) {
    registry.register(FN_UART_BAUDRATE, move |mb: &mut Mailbox| {
        let baudrate = arg(mb, 1);
        with(&*uart, "uart baudrate", |p| {
            p.set_baudrate(baudrate).map(|_| RC_UART_BAUDRATE)
        })
    });
}

/// Switch pattern in word 1, see [`HBridgeSwitches::from_word`]
pub fn register_hbridge_functions(registry: &mut FunctionRegistry, hbridge: Arc<Mutex<dyn HBridge>>) {
    registry.register(FN_HBRIDGE, move |mb: &mut Mailbox| {
        let switches = HBridgeSwitches::from_word(arg(mb, 1));
        with(&*hbridge, "h-bridge", |p| p.set_switches(switches).map(|_| RC_HBRIDGE))
    });
}
