// libdand/src/protocol/mod.rs

//! Wire formats: frames, Dandelion requests and responses, CRC-A.

pub mod crc;
pub mod frame;
pub mod parser;
pub mod request;
pub mod response;

pub use crc::{append_crc_a, check_crc_a, crc_a, odd_parity, verify_crc_a};
pub use frame::{Frame, FrameType, RawFrame};
pub use request::{DandCommand, DandelionRequest};
pub use response::{DandStatus, DandelionResponse};
