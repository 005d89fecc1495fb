//! # OSEX Common
//!
//! Common types and utilities shared across the OSEX crates.
//!
//! This crate provides the foundational pieces every other OSEX crate
//! builds upon: the error taxonomy (configuration vs. native OS failures),
//! small domain enums used at the host boundary, and the process-wide lock
//! guarding the environment block.

pub mod env_lock;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use env_lock::{env_read_lock, env_write_lock};
pub use errors::{Error, NativeError, Result, ResultExt};
pub use types::{EntryType, LockMode, StdStream};
