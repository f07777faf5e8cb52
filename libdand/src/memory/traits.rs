// libdand/src/memory/traits.rs

//! The [`MemoryBus`] trait.

use crate::Result;

/// MemoryBus abstracts the chip's address space (ROM, RAM, peripheral
/// registers, NVM read window) away from the protocol logic. Privilege
/// checks happen before any call reaches the bus.
pub trait MemoryBus: Send {
    /// Read one byte
    fn read_u8(&mut self, address: u32) -> Result<u8>;

    /// Write one byte
    fn write_u8(&mut self, address: u32, value: u8) -> Result<()>;

    /// Fail with `BusFault` unless every byte of `[address, address + len)`
    /// is backed by the bus. The default wide writes consult it before
    /// the first byte is written.
    fn check_range(&self, address: u32, len: u32) -> Result<()>;

    /// Read a halfword. Default implementation composes two byte reads in
    /// the CPU's little-endian order.
    fn read_u16(&mut self, address: u32) -> Result<u16> {
        let lo = self.read_u8(address)?;
        let hi = self.read_u8(address.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Read a word. Default implementation composes byte reads.
    fn read_u32(&mut self, address: u32) -> Result<u32> {
        let mut b = [0u8; 4];
        for (i, slot) in b.iter_mut().enumerate() {
            *slot = self.read_u8(address.wrapping_add(i as u32))?;
        }
        Ok(u32::from_le_bytes(b))
    }

    /// Write a halfword. Implementations backed by peripheral registers
    /// should override this so the register sees a single access.
    fn write_u16(&mut self, address: u32, value: u16) -> Result<()> {
        self.check_range(address, 2)?;
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self.write_u8(address.wrapping_add(i as u32), *b)?;
        }
        Ok(())
    }

    /// Write a word
    fn write_u32(&mut self, address: u32, value: u32) -> Result<()> {
        self.check_range(address, 4)?;
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self.write_u8(address.wrapping_add(i as u32), *b)?;
        }
        Ok(())
    }
}
