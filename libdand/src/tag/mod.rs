// libdand/src/tag/mod.rs

//! The tag handle and its configuration.

pub mod builder;
pub mod config;
pub mod handle;

pub use builder::TagBuilder;
pub use config::TagConfig;
pub use handle::{Initialized, Tag, Uninitialized};
