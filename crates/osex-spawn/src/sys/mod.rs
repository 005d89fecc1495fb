//! Native launchers.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::{FileActions, PosixChild, PosixLauncher};
#[cfg(unix)]
pub use unix::{PosixChild as Child, PosixLauncher as NativeLauncher};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use self::windows::{StdHandles, WindowsChild, WindowsLauncher};
#[cfg(windows)]
pub use self::windows::{WindowsChild as Child, WindowsLauncher as NativeLauncher};
