//! # OSEX Host
//!
//! The boundary between OSEX and an embedding scripting host.
//!
//! This crate provides:
//! - A dynamic [`Value`] model (nil, booleans, numbers, strings, tables,
//!   functions, and file/process/directory references)
//! - Validation of spawn option tables into a [`SpawnRequest`]
//! - The host functions themselves, following the `(nil, message)` result
//!   convention for OS failures
//! - [`install`], which publishes everything as `ex` and extends the host's
//!   `os` and `io` tables

pub mod errors;
pub mod functions;
pub mod library;
pub mod options;
pub mod value;

pub use errors::{HostError, HostResult};
pub use library::{ex_table, install};
pub use options::SpawnRequest;
pub use value::{HostFile, HostFunction, Table, TableRef, Value};
