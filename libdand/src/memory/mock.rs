// libdand/src/memory/mock.rs

//! Sparse simulated memory.

use std::collections::BTreeMap;

use crate::memory::traits::MemoryBus;
use crate::{Error, Result};

/// Simulated address space for tests and host-side demos. Only mapped
/// ranges are accessible; everything else raises `BusFault`. Every access
/// is recorded.
#[derive(Debug, Default)]
pub struct SimulatedMemory {
    cells: BTreeMap<u32, u8>,
    ranges: Vec<(u32, u32)>,
    /// Record of reads: (address, width in bytes)
    pub reads: Vec<(u32, usize)>,
    /// Record of writes: (address, width in bytes, value)
    pub writes: Vec<(u32, usize, u32)>,
}

impl SimulatedMemory {
    /// Nothing mapped
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `[start, start + len)` accessible, zero filled.
    pub fn map(&mut self, start: u32, len: u32) {
        self.ranges.push((start, start.saturating_add(len)));
    }

    /// Preload bytes without recording a write
    pub fn load(&mut self, address: u32, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.cells.insert(address.wrapping_add(i as u32), *b);
        }
    }

    /// Inspect a byte without recording a read
    pub fn peek(&self, address: u32) -> u8 {
        self.cells.get(&address).copied().unwrap_or(0)
    }

    fn is_mapped(&self, address: u32) -> bool {
        self.ranges
            .iter()
            .any(|&(start, stop)| address >= start && address < stop)
    }

    fn check(&self, address: u32, width: u32) -> Result<()> {
        for i in 0..width {
            let a = address.wrapping_add(i);
            if !self.is_mapped(a) {
                return Err(Error::BusFault { address: a });
            }
        }
        Ok(())
    }
}

impl MemoryBus for SimulatedMemory {
    fn check_range(&self, address: u32, len: u32) -> Result<()> {
        self.check(address, len)
    }

    fn read_u8(&mut self, address: u32) -> Result<u8> {
        self.check(address, 1)?;
        self.reads.push((address, 1));
        Ok(self.peek(address))
    }

    fn write_u8(&mut self, address: u32, value: u8) -> Result<()> {
        self.check(address, 1)?;
        self.writes.push((address, 1, value as u32));
        self.cells.insert(address, value);
        Ok(())
    }

    fn read_u16(&mut self, address: u32) -> Result<u16> {
        self.check(address, 2)?;
        self.reads.push((address, 2));
        Ok(u16::from_le_bytes([
            self.peek(address),
            self.peek(address.wrapping_add(1)),
        ]))
    }

    fn read_u32(&mut self, address: u32) -> Result<u32> {
        self.check(address, 4)?;
        self.reads.push((address, 4));
        let mut b = [0u8; 4];
        for (i, slot) in b.iter_mut().enumerate() {
            *slot = self.peek(address.wrapping_add(i as u32));
        }
        Ok(u32::from_le_bytes(b))
    }

    fn write_u16(&mut self, address: u32, value: u16) -> Result<()> {
        self.check(address, 2)?;
        self.writes.push((address, 2, value as u32));
        self.load(address, &value.to_le_bytes());
        Ok(())
    }

    fn write_u32(&mut self, address: u32, value: u32) -> Result<()> {
        self.check(address, 4)?;
        self.writes.push((address, 4, value));
        self.load(address, &value.to_le_bytes());
        Ok(())
    }
}
