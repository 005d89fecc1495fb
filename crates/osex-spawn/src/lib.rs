//! # OSEX Spawn
//!
//! Child process creation for OSEX.
//!
//! This crate provides:
//! - Argument list encoding (`argv` on POSIX, a quoted command line on
//!   Windows)
//! - Environment encoding, with inheritance kept distinct from an explicit
//!   empty environment
//! - Standard stream redirection to caller-owned files
//! - A staged [`SpawnParams`] builder driving a platform [`Launcher`]
//! - A [`Process`] handle whose exit status is memoized after the first wait
//!
//! ```rust,no_run
//! use osex_spawn::{spawn, ArgList, SpawnOptions};
//!
//! let options = SpawnOptions::new().args(ArgList::new(["hello", "world"]));
//! let mut process = spawn("echo", &options)?;
//! assert_eq!(process.wait()?, 0);
//! # Ok::<(), osex_common::Error>(())
//! ```
//!
//! POSIX looks the command up on `PATH`. Windows applies the
//! `CreateProcess` search order instead; the two are not normalized.

pub mod args;
pub mod cmdline;
pub mod environment;
pub mod launcher;
pub mod params;
pub mod process;
pub mod sys;

pub use args::ArgList;
pub use environment::Environment;
pub use launcher::{Launcher, RedirectTarget, StdioRef};
pub use params::{SpawnParams, SpawnStage};
pub use process::{NativeChild, Process, ProcessStatus};
pub use sys::NativeLauncher;

use osex_common::{Result, StdStream};

/// Everything about a spawn except the command.
///
/// Omitted arguments mean the command alone; an omitted environment means
/// the parent's is inherited.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions<'a> {
    args: Option<ArgList>,
    env: Option<Environment>,
    redirects: [Option<StdioRef<'a>>; 3],
}

impl<'a> SpawnOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn args(mut self, args: ArgList) -> Self {
        self.args = Some(args);
        self
    }

    /// Replaces the child's environment with exactly `env`.
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    pub fn redirect<T>(mut self, stream: StdStream, target: &'a T) -> Self
    where
        T: RedirectTarget + ?Sized,
    {
        self.redirects[stream.index()] = Some(target.as_stdio());
        self
    }

    pub fn stdin<T: RedirectTarget + ?Sized>(self, target: &'a T) -> Self {
        self.redirect(StdStream::Stdin, target)
    }

    pub fn stdout<T: RedirectTarget + ?Sized>(self, target: &'a T) -> Self {
        self.redirect(StdStream::Stdout, target)
    }

    pub fn stderr<T: RedirectTarget + ?Sized>(self, target: &'a T) -> Self {
        self.redirect(StdStream::Stderr, target)
    }

    /// Builds the staged parameters for `command` without starting it.
    pub fn to_params<L: Launcher>(&self, command: &str) -> Result<SpawnParams<'a, L>> {
        let mut params = SpawnParams::<L>::new(command)?;
        if let Some(args) = &self.args {
            params.args(args)?;
        }
        params.env(self.env.as_ref())?;
        for stream in StdStream::ALL {
            if let Some(target) = self.redirects[stream.index()] {
                params.redirect_stdio(stream, target)?;
            }
        }
        Ok(params)
    }
}

/// Starts `command` with the native launcher.
pub fn spawn(command: &str, options: &SpawnOptions<'_>) -> Result<Process> {
    spawn_with::<NativeLauncher>(command, options)
}

/// Starts `command` with launcher `L`.
pub fn spawn_with<L: Launcher>(command: &str, options: &SpawnOptions<'_>) -> Result<Process<L::Child>> {
    options.to_params::<L>(command)?.execute()
}
