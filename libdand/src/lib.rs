// libdand/src/lib.rs

//! libdand
//!
//! ISO 14443-3 tag front-end carrying the Dandelion register and function
//! access protocol: frame classification, anticollision, the link state
//! machine, the command dispatcher and the memory protection layer.
#![warn(missing_docs)]

pub mod constants;
pub mod dispatch;
pub mod error;
pub mod link;
pub mod mailbox;
pub mod memory;
pub mod peripherals;
pub mod prelude;
pub mod protection;
pub mod protocol;
pub mod tag;
pub mod test_support;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available everywhere.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
