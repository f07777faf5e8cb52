// libdand/src/memory/mod.rs

//! Memory bus seen by the dispatcher.

pub mod mock;
pub mod traits;

pub use mock::SimulatedMemory;
pub use traits::MemoryBus;
