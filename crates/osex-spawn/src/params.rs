//! Spawn parameters and the executor.
//!
//! Parameters are built in a fixed order: command, then arguments, then
//! environment, then any number of redirections. Each step is optional
//! except the command. [`SpawnParams::execute`] consumes the parameters, so
//! every staged resource is released exactly once whatever the outcome.

use crate::args::ArgList;
use crate::environment::Environment;
use crate::launcher::{Launcher, RedirectTarget, StdioRef};
use crate::process::Process;
use osex_common::{Error, Result, StdStream};
use std::fmt;
use tracing::{debug, info, warn};

/// Build stage of a [`SpawnParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnStage {
    /// Only the command is known.
    FilenameSet,
    /// An explicit argument list has been encoded.
    ArgsSet,
    /// The environment decision has been made.
    EnvSet,
    /// At least one redirection has been staged.
    RedirectsSet,
}

impl SpawnStage {
    /// Check if moving from this stage to `target` keeps the build order.
    pub fn is_valid_transition(&self, target: SpawnStage) -> bool {
        match (self, target) {
            (SpawnStage::FilenameSet, SpawnStage::ArgsSet) => true,
            (SpawnStage::FilenameSet, SpawnStage::EnvSet) => true,
            (SpawnStage::FilenameSet, SpawnStage::RedirectsSet) => true,

            (SpawnStage::ArgsSet, SpawnStage::EnvSet) => true,
            (SpawnStage::ArgsSet, SpawnStage::RedirectsSet) => true,

            (SpawnStage::EnvSet, SpawnStage::RedirectsSet) => true,

            // Several streams may be redirected.
            (SpawnStage::RedirectsSet, SpawnStage::RedirectsSet) => true,

            _ => false,
        }
    }
}

impl fmt::Display for SpawnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnStage::FilenameSet => write!(f, "filename-set"),
            SpawnStage::ArgsSet => write!(f, "args-set"),
            SpawnStage::EnvSet => write!(f, "env-set"),
            SpawnStage::RedirectsSet => write!(f, "redirects-set"),
        }
    }
}

/// Transient aggregate describing one process to start.
pub struct SpawnParams<'a, L: Launcher = crate::NativeLauncher> {
    command: String,
    args: Option<L::Args>,
    env: Option<L::Env>,
    redirects: L::Redirects<'a>,
    stage: SpawnStage,
}

impl<'a, L: Launcher> SpawnParams<'a, L> {
    /// Starts a new parameter set for `command`.
    ///
    /// The command is looked up on `PATH` on POSIX; on Windows the
    /// `CreateProcess` search order applies.
    pub fn new(command: impl Into<String>) -> Result<Self> {
        let command = command.into();
        if command.is_empty() {
            return Err(Error::configuration("no command specified"));
        }
        if command.contains('\0') {
            return Err(Error::configuration(format!(
                "command contains an embedded NUL: {:?}",
                command
            )));
        }
        Ok(Self {
            redirects: L::new_redirects()?,
            command,
            args: None,
            env: None,
            stage: SpawnStage::FilenameSet,
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn stage(&self) -> SpawnStage {
        self.stage
    }

    fn advance(&mut self, target: SpawnStage) -> Result<()> {
        if !self.stage.is_valid_transition(target) {
            return Err(Error::invalid_stage(target.to_string(), self.stage.to_string()));
        }
        Ok(())
    }

    /// Encodes an explicit argument list.
    pub fn args(&mut self, args: &ArgList) -> Result<&mut Self> {
        self.advance(SpawnStage::ArgsSet)?;
        self.args = Some(L::build_args(&self.command, args)?);
        self.stage = SpawnStage::ArgsSet;
        Ok(self)
    }

    /// Decides the child's environment.
    ///
    /// `None` inherits the parent's environment at execute time. `Some`
    /// replaces it exactly, even when the mapping is empty.
    pub fn env(&mut self, env: Option<&Environment>) -> Result<&mut Self> {
        self.advance(SpawnStage::EnvSet)?;
        self.apply_default_args()?;
        self.env = match env {
            Some(env) => Some(L::build_env(env)?),
            None => None,
        };
        self.stage = SpawnStage::EnvSet;
        Ok(self)
    }

    /// Stages `target` as the child's `stream`.
    pub fn redirect<T>(&mut self, stream: StdStream, target: &'a T) -> Result<&mut Self>
    where
        T: RedirectTarget + ?Sized,
    {
        self.redirect_stdio(stream, target.as_stdio())
    }

    /// Stages an already borrowed descriptor or handle as the child's
    /// `stream`.
    pub fn redirect_stdio(&mut self, stream: StdStream, target: StdioRef<'a>) -> Result<&mut Self> {
        self.advance(SpawnStage::RedirectsSet)?;
        self.apply_default_args()?;
        L::add_redirect(&mut self.redirects, stream, target)?;
        debug!("Redirected {} of {}", stream, self.command);
        self.stage = SpawnStage::RedirectsSet;
        Ok(self)
    }

    fn apply_default_args(&mut self) -> Result<()> {
        if self.args.is_none() {
            self.args = Some(L::default_args(&self.command)?);
        }
        Ok(())
    }

    /// Starts the process.
    ///
    /// On failure no process handle exists and the error carries the OS
    /// code and description.
    pub fn execute(mut self) -> Result<Process<L::Child>> {
        self.apply_default_args()?;
        let args = match self.args.as_ref() {
            Some(args) => args,
            None => return Err(Error::invalid_stage("args-set", self.stage.to_string())),
        };

        info!("Spawning process: {}", self.command);
        match L::launch(&self.command, args, self.env.as_ref(), &self.redirects) {
            Ok(child) => {
                let process = Process::from_child(child);
                info!("Spawned process: {} (pid {})", self.command, process.id());
                Ok(process)
            }
            Err(e) => {
                warn!("Failed to spawn process {}: {}", self.command, e);
                Err(Error::native(format!("spawn {}", self.command), e))
            }
        }
    }
}

impl<L: Launcher> fmt::Debug for SpawnParams<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnParams")
            .field("command", &self.command)
            .field("stage", &self.stage)
            .field("inherit_env", &self.env.is_none())
            .finish()
    }
}
