//! POSIX launcher built on `posix_spawnp`.

use crate::args::{build_argv, default_argv, ArgList};
use crate::environment::{build_envp, Environment};
use crate::launcher::{Launcher, StdioRef};
use crate::process::NativeChild;
use libc::{c_char, c_int};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;
use osex_common::{env_read_lock, Error, NativeError, Result, StdStream};
use std::ffi::CString;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, BorrowedFd};
use std::ptr;

/// Launches children with `posix_spawnp`, searching `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixLauncher;

/// A `posix_spawn_file_actions_t`, destroyed on drop.
///
/// Staged descriptors are borrowed for `'a`: the caller's files must
/// outlive the spawn.
pub struct FileActions<'a> {
    actions: Box<MaybeUninit<libc::posix_spawn_file_actions_t>>,
    _fds: PhantomData<BorrowedFd<'a>>,
}

impl FileActions<'_> {
    fn new() -> std::result::Result<Self, NativeError> {
        let mut actions = Box::new(MaybeUninit::uninit());
        let rc = unsafe { libc::posix_spawn_file_actions_init(actions.as_mut_ptr()) };
        if rc != 0 {
            return Err(NativeError::from_raw(rc));
        }
        Ok(Self {
            actions,
            _fds: PhantomData,
        })
    }

    fn add_dup2(&mut self, fd: c_int, target: c_int) -> std::result::Result<(), NativeError> {
        let rc = unsafe { libc::posix_spawn_file_actions_adddup2(self.actions.as_mut_ptr(), fd, target) };
        if rc != 0 {
            return Err(NativeError::from_raw(rc));
        }
        Ok(())
    }

    fn as_ptr(&self) -> *const libc::posix_spawn_file_actions_t {
        self.actions.as_ptr()
    }
}

impl Drop for FileActions<'_> {
    fn drop(&mut self) {
        unsafe {
            libc::posix_spawn_file_actions_destroy(self.actions.as_mut_ptr());
        }
    }
}

impl std::fmt::Debug for FileActions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileActions").finish_non_exhaustive()
    }
}

/// A child started by [`PosixLauncher`].
#[derive(Debug)]
pub struct PosixChild {
    pid: Pid,
}

impl NativeChild for PosixChild {
    fn id(&self) -> u32 {
        self.pid.as_raw() as u32
    }

    fn wait(&mut self) -> std::result::Result<i32, NativeError> {
        let pid = self.pid;
        wait_until_exit(|| waitpid(pid, None))
    }
}

/// Polls `waiter` until it reports an exit. A signal-killed child reports
/// `128 + signal`.
fn wait_until_exit<F>(mut waiter: F) -> std::result::Result<i32, NativeError>
where
    F: FnMut() -> nix::Result<WaitStatus>,
{
    loop {
        match waiter() {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(128 + signal as i32),
            // Stop/continue reports; keep waiting for the exit.
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(errno.into()),
        }
    }
}

/// Null-terminated pointer array over `strings`, valid while they live.
fn pointer_array(strings: &[CString]) -> Vec<*mut c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr() as *mut c_char)
        .chain(std::iter::once(ptr::null_mut()))
        .collect()
}

#[cfg(not(target_vendor = "apple"))]
unsafe fn environ() -> *const *mut c_char {
    extern "C" {
        static mut environ: *const *mut c_char;
    }
    ptr::addr_of!(environ).read()
}

#[cfg(target_vendor = "apple")]
unsafe fn environ() -> *const *mut c_char {
    *libc::_NSGetEnviron() as *const *mut c_char
}

impl Launcher for PosixLauncher {
    type Args = Vec<CString>;
    type Env = Vec<CString>;
    type Redirects<'a> = FileActions<'a>;
    type Child = PosixChild;

    fn build_args(command: &str, args: &ArgList) -> Result<Self::Args> {
        build_argv(command, args)
    }

    fn default_args(command: &str) -> Result<Self::Args> {
        default_argv(command)
    }

    fn build_env(env: &Environment) -> Result<Self::Env> {
        build_envp(env)
    }

    fn new_redirects<'a>() -> Result<Self::Redirects<'a>> {
        FileActions::new().map_err(|e| Error::native("posix_spawn_file_actions_init", e))
    }

    fn add_redirect<'a>(
        redirects: &mut Self::Redirects<'a>,
        stream: StdStream,
        target: StdioRef<'a>,
    ) -> Result<()> {
        redirects
            .add_dup2(target.as_raw_fd(), stream.fd())
            .map_err(|e| Error::native(format!("redirect {}", stream), e))
    }

    fn launch(
        command: &str,
        args: &Self::Args,
        env: Option<&Self::Env>,
        redirects: &Self::Redirects<'_>,
    ) -> std::result::Result<Self::Child, NativeError> {
        let file = CString::new(command).map_err(|_| NativeError::from_raw(libc::EINVAL))?;
        let argv = pointer_array(args);
        let mut pid: libc::pid_t = 0;

        let rc = match env {
            Some(envp) => {
                let envp = pointer_array(envp);
                unsafe {
                    libc::posix_spawnp(
                        &mut pid,
                        file.as_ptr(),
                        redirects.as_ptr(),
                        ptr::null(),
                        argv.as_ptr(),
                        envp.as_ptr(),
                    )
                }
            }
            None => {
                // Hold off setenv/unsetenv while the child copies environ.
                let _env_lock = env_read_lock();
                unsafe {
                    libc::posix_spawnp(
                        &mut pid,
                        file.as_ptr(),
                        redirects.as_ptr(),
                        ptr::null(),
                        argv.as_ptr(),
                        environ(),
                    )
                }
            }
        };

        if rc != 0 {
            return Err(NativeError::from_raw(rc));
        }
        Ok(PosixChild {
            pid: Pid::from_raw(pid),
        })
    }
}
