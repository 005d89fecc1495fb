//! The platform seam of the spawn subsystem.
//!
//! A [`Launcher`] knows how to encode arguments, environments and
//! redirections for one platform and how to start a process from them.
//! [`SpawnParams`](crate::SpawnParams) drives it in a fixed order and never
//! touches platform types itself.

use crate::args::ArgList;
use crate::environment::Environment;
use crate::process::NativeChild;
use osex_common::{NativeError, Result, StdStream};

/// A borrowed standard-stream target: a descriptor on POSIX.
#[cfg(unix)]
pub type StdioRef<'a> = std::os::fd::BorrowedFd<'a>;

/// A borrowed standard-stream target: a handle on Windows.
#[cfg(windows)]
pub type StdioRef<'a> = std::os::windows::io::BorrowedHandle<'a>;

/// Anything a child's standard stream can be redirected to.
///
/// The target is only borrowed. It is never closed and stays owned by the
/// caller.
pub trait RedirectTarget {
    fn as_stdio(&self) -> StdioRef<'_>;
}

#[cfg(unix)]
impl<T: std::os::fd::AsFd + ?Sized> RedirectTarget for T {
    fn as_stdio(&self) -> StdioRef<'_> {
        self.as_fd()
    }
}

#[cfg(windows)]
impl<T: std::os::windows::io::AsHandle + ?Sized> RedirectTarget for T {
    fn as_stdio(&self) -> StdioRef<'_> {
        self.as_handle()
    }
}

/// One platform variant of process creation.
pub trait Launcher {
    /// Encoded argument list.
    type Args;
    /// Encoded explicit environment.
    type Env;
    /// Redirect staging area, borrowing every staged target for `'a`.
    type Redirects<'a>;
    /// Native reference to a started child.
    type Child: NativeChild;

    /// Encodes a caller-supplied argument list.
    fn build_args(command: &str, args: &ArgList) -> Result<Self::Args>;

    /// The arguments used when the caller supplies none.
    fn default_args(command: &str) -> Result<Self::Args>;

    /// Encodes an explicit environment.
    fn build_env(env: &Environment) -> Result<Self::Env>;

    /// Creates an empty redirect staging area.
    fn new_redirects<'a>() -> Result<Self::Redirects<'a>>;

    /// Stages `target` as the child's `stream`.
    fn add_redirect<'a>(
        redirects: &mut Self::Redirects<'a>,
        stream: StdStream,
        target: StdioRef<'a>,
    ) -> Result<()>;

    /// Starts the child. `env == None` means inherit the parent's
    /// environment.
    fn launch(
        command: &str,
        args: &Self::Args,
        env: Option<&Self::Env>,
        redirects: &Self::Redirects<'_>,
    ) -> std::result::Result<Self::Child, NativeError>;
}
