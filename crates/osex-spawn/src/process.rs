//! Process handle with a memoized exit status.

use osex_common::{Error, NativeError, Result};
use std::fmt;
use tracing::{debug, warn};

/// Native reference to a running child.
pub trait NativeChild {
    /// OS process identifier.
    fn id(&self) -> u32;

    /// Blocks until the child exits and returns its exit code.
    ///
    /// Called at most once per child by [`Process`].
    fn wait(&mut self) -> std::result::Result<i32, NativeError>;
}

/// Exit status of a spawned process as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// No successful wait yet.
    Running,
    /// The child exited with this code.
    Exited(i32),
}

impl ProcessStatus {
    /// The exit code, or `-1` while the process has not been waited on.
    pub fn code(&self) -> i32 {
        match self {
            ProcessStatus::Running => -1,
            ProcessStatus::Exited(code) => *code,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ProcessStatus::Running)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Running => write!(f, "running"),
            ProcessStatus::Exited(_) => write!(f, "terminated"),
        }
    }
}

/// A spawned child process and its eventual exit status.
///
/// The first successful [`wait`](Process::wait) stores the exit code; later
/// calls return it without asking the OS again.
#[derive(Debug)]
pub struct Process<C: NativeChild = crate::sys::Child> {
    child: C,
    status: ProcessStatus,
}

impl<C: NativeChild> Process<C> {
    /// Wraps a freshly started child.
    pub fn from_child(child: C) -> Self {
        Self {
            child,
            status: ProcessStatus::Running,
        }
    }

    /// OS process identifier.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    /// The exit code, if the process has been waited on.
    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            ProcessStatus::Running => None,
            ProcessStatus::Exited(code) => Some(code),
        }
    }

    /// Blocks until the child exits and returns its exit code.
    ///
    /// A failing wait leaves the status untouched and is reported as a
    /// native error.
    pub fn wait(&mut self) -> Result<i32> {
        if let ProcessStatus::Exited(code) = self.status {
            return Ok(code);
        }
        let pid = self.child.id();
        debug!("Waiting for process: {}", pid);
        match self.child.wait() {
            Ok(code) => {
                debug!("Process {} exited with code {}", pid, code);
                self.status = ProcessStatus::Exited(code);
                Ok(code)
            }
            Err(e) => {
                warn!("Failed to wait for process {}: {}", pid, e);
                Err(Error::native("wait", e))
            }
        }
    }

    /// The native child reference.
    pub fn child(&self) -> &C {
        &self.child
    }
}

impl<C: NativeChild> fmt::Display for Process<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "process ({}, {})", self.child.id(), self.status)
    }
}
