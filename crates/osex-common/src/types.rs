//! Core domain types shared by the OSEX crates.

use crate::errors::{Error, Result};
use std::fmt;

/// One of the three standard streams a child process inherits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdStream {
    Stdin,
    Stdout,
    Stderr,
}

impl StdStream {
    /// All streams, in descriptor order.
    pub const ALL: [StdStream; 3] = [StdStream::Stdin, StdStream::Stdout, StdStream::Stderr];

    /// The option name used at the host boundary.
    pub fn name(&self) -> &'static str {
        match self {
            StdStream::Stdin => "stdin",
            StdStream::Stdout => "stdout",
            StdStream::Stderr => "stderr",
        }
    }

    /// The POSIX descriptor number (0, 1 or 2).
    pub fn fd(&self) -> i32 {
        match self {
            StdStream::Stdin => 0,
            StdStream::Stdout => 1,
            StdStream::Stderr => 2,
        }
    }

    /// Position in descriptor order, usable as an array index.
    pub fn index(&self) -> usize {
        self.fd() as usize
    }
}

impl fmt::Display for StdStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Advisory lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Shared lock.
    Read,
    /// Exclusive lock.
    Write,
    /// Release a previously taken lock.
    Unlock,
}

impl LockMode {
    /// Parses a host mode string. Only the first character matters:
    /// `r`ead, `w`rite or `u`nlock.
    pub fn parse(mode: &str) -> Result<Self> {
        match mode.chars().next() {
            Some('r') => Ok(LockMode::Read),
            Some('w') => Ok(LockMode::Write),
            Some('u') => Ok(LockMode::Unlock),
            _ => Err(Error::configuration(format!("invalid mode '{}'", mode))),
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockMode::Read => write!(f, "read"),
            LockMode::Write => write!(f, "write"),
            LockMode::Unlock => write!(f, "unlock"),
        }
    }
}

/// Kind of a filesystem entry as reported by `dir` and `dirent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryType {
    File,
    Directory,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::File => "file",
            EntryType::Directory => "directory",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
