// libdand/src/prelude.rs

//! Commonly used types, for `use libdand::prelude::*`.

pub use crate::link::TagState;
pub use crate::mailbox::{Mailbox, Notification};
pub use crate::memory::{MemoryBus, SimulatedMemory};
pub use crate::protection::{AccessDecision, MemoryProtection, ProtectionConfig, Region};
pub use crate::protocol::{
    DandCommand, DandStatus, DandelionRequest, DandelionResponse, Frame, FrameType, RawFrame,
};
pub use crate::tag::{Initialized, Tag, TagBuilder, TagConfig, Uninitialized};
pub use crate::{AccessIntent, AccessState, AccessWidth, Error, Result, Uid};

pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, parse_hex};
