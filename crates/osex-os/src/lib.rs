//! # OSEX OS
//!
//! Thin wrappers over the operating system for the OSEX host library:
//! environment variables, sleeping, working directory and directory
//! listing, entry metadata, advisory locks and anonymous pipes.
//!
//! Every operation reports OS failures as [`osex_common::Error::Native`],
//! carrying the raw error code and the OS description.

pub mod dir;
pub mod env;
pub mod lock;
pub mod pipe;
pub mod time;

pub use dir::{chdir, currentdir, dir, dirent, mkdir, DirEntry, DirIter, DirentTarget, EntryInfo};
pub use env::{environ, getenv, setenv, unsetenv};
pub use lock::{lock, unlock};
pub use pipe::pipe;
pub use time::sleep;
