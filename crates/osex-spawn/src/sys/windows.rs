//! Windows launcher built on `CreateProcessW`.
//!
//! `CreateProcessW` inherits every inheritable handle in the parent. Redirect
//! handles are only marked inheritable while the lock below is held, and
//! their previous flags are restored before it is released. Processes created
//! outside this crate (without the lock) can still race with that window.

use crate::args::ArgList;
use crate::cmdline::{build_command_line, default_command_line};
use crate::environment::{build_env_block, Environment};
use crate::launcher::{Launcher, StdioRef};
use crate::process::NativeChild;
use osex_common::{Error, NativeError, Result, StdStream};
use parking_lot::Mutex;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::os::windows::io::{AsRawHandle, BorrowedHandle};
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{
    CloseHandle, GetHandleInformation, SetHandleInformation, HANDLE, HANDLE_FLAGS,
    HANDLE_FLAG_INHERIT, WAIT_FAILED,
};
use windows::Win32::System::Console::{
    GetStdHandle, STD_ERROR_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};
use windows::Win32::System::Threading::{
    CreateProcessW, GetExitCodeProcess, WaitForSingleObject, CREATE_UNICODE_ENVIRONMENT,
    INFINITE, PROCESS_CREATION_FLAGS, PROCESS_INFORMATION, STARTF_USESTDHANDLES, STARTUPINFOW,
    STARTUPINFOW_FLAGS,
};

/// Serializes `CreateProcessW` so redirect handles reach only their child.
static CREATE_PROCESS_LOCK: Mutex<()> = Mutex::new(());

/// Launches children with `CreateProcessW`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsLauncher;

/// Standard handles staged in a `STARTUPINFOW`.
pub struct StdHandles<'a> {
    info: STARTUPINFOW,
    redirected: Vec<HANDLE>,
    _handles: PhantomData<BorrowedHandle<'a>>,
}

impl StdHandles<'_> {
    fn new() -> Self {
        Self {
            info: STARTUPINFOW {
                cb: std::mem::size_of::<STARTUPINFOW>() as u32,
                ..Default::default()
            },
            redirected: Vec::new(),
            _handles: PhantomData,
        }
    }

    fn uses_std_handles(&self) -> bool {
        self.info.dwFlags.0 & STARTF_USESTDHANDLES.0 != 0
    }

    /// Switches to explicit standard handles, starting from the parent's own.
    fn enable(&mut self) -> std::result::Result<(), NativeError> {
        unsafe {
            self.info.hStdInput = GetStdHandle(STD_INPUT_HANDLE)?;
            self.info.hStdOutput = GetStdHandle(STD_OUTPUT_HANDLE)?;
            self.info.hStdError = GetStdHandle(STD_ERROR_HANDLE)?;
        }
        self.info.dwFlags = STARTUPINFOW_FLAGS(self.info.dwFlags.0 | STARTF_USESTDHANDLES.0);
        Ok(())
    }

    fn set(&mut self, stream: StdStream, handle: HANDLE) -> std::result::Result<(), NativeError> {
        if !self.uses_std_handles() {
            self.enable()?;
        }
        self.redirected.push(handle);
        match stream {
            StdStream::Stdin => self.info.hStdInput = handle,
            StdStream::Stdout => self.info.hStdOutput = handle,
            StdStream::Stderr => self.info.hStdError = handle,
        }
        Ok(())
    }
}

impl std::fmt::Debug for StdHandles<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdHandles")
            .field("uses_std_handles", &self.uses_std_handles())
            .finish()
    }
}

/// Marks handles inheritable and restores their previous flags on drop.
#[derive(Default)]
struct InheritScope {
    previous: Vec<(HANDLE, u32)>,
}

impl InheritScope {
    fn mark(&mut self, handle: HANDLE) -> std::result::Result<(), NativeError> {
        let mut flags = 0u32;
        unsafe {
            GetHandleInformation(handle, &mut flags)?;
            self.previous.push((handle, flags));
            SetHandleInformation(handle, HANDLE_FLAG_INHERIT.0, HANDLE_FLAG_INHERIT)?;
        }
        Ok(())
    }
}

impl Drop for InheritScope {
    fn drop(&mut self) {
        // Reverse order, so a handle redirected twice ends at its first flags.
        for (handle, flags) in self.previous.iter().rev() {
            unsafe {
                let _ = SetHandleInformation(
                    *handle,
                    HANDLE_FLAG_INHERIT.0,
                    HANDLE_FLAGS(flags & HANDLE_FLAG_INHERIT.0),
                );
            }
        }
    }
}

/// A child started by [`WindowsLauncher`]. Owns the process handle.
#[derive(Debug)]
pub struct WindowsChild {
    handle: HANDLE,
    pid: u32,
}

impl NativeChild for WindowsChild {
    fn id(&self) -> u32 {
        self.pid
    }

    fn wait(&mut self) -> std::result::Result<i32, NativeError> {
        unsafe {
            if WaitForSingleObject(self.handle, INFINITE) == WAIT_FAILED {
                return Err(NativeError::last());
            }
            let mut code: u32 = 0;
            GetExitCodeProcess(self.handle, &mut code)?;
            Ok(code as i32)
        }
    }
}

impl Drop for WindowsChild {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

impl Launcher for WindowsLauncher {
    type Args = String;
    type Env = Vec<u16>;
    type Redirects<'a> = StdHandles<'a>;
    type Child = WindowsChild;

    fn build_args(command: &str, args: &ArgList) -> Result<Self::Args> {
        Ok(build_command_line(command, args))
    }

    fn default_args(command: &str) -> Result<Self::Args> {
        Ok(default_command_line(command))
    }

    fn build_env(env: &Environment) -> Result<Self::Env> {
        build_env_block(env)
    }

    fn new_redirects<'a>() -> Result<Self::Redirects<'a>> {
        Ok(StdHandles::new())
    }

    fn add_redirect<'a>(
        redirects: &mut Self::Redirects<'a>,
        stream: StdStream,
        target: StdioRef<'a>,
    ) -> Result<()> {
        redirects
            .set(stream, HANDLE(target.as_raw_handle()))
            .map_err(|e| Error::native(format!("redirect {}", stream), e))
    }

    fn launch(
        _command: &str,
        args: &Self::Args,
        env: Option<&Self::Env>,
        redirects: &Self::Redirects<'_>,
    ) -> std::result::Result<Self::Child, NativeError> {
        // CreateProcessW may write into the command line buffer.
        let mut command_line: Vec<u16> = args.encode_utf16().chain(std::iter::once(0)).collect();
        let environment = env.map(|block| block.as_ptr() as *const c_void);
        let flags = match env {
            Some(_) => CREATE_UNICODE_ENVIRONMENT,
            None => PROCESS_CREATION_FLAGS(0),
        };
        let mut info = PROCESS_INFORMATION::default();

        let _create_lock = CREATE_PROCESS_LOCK.lock();
        let mut inherit = InheritScope::default();
        for handle in &redirects.redirected {
            inherit.mark(*handle)?;
        }
        unsafe {
            CreateProcessW(
                PCWSTR::null(),
                PWSTR(command_line.as_mut_ptr()),
                None,
                None,
                true,
                flags,
                environment,
                PCWSTR::null(),
                &redirects.info,
                &mut info,
            )?;
            let _ = CloseHandle(info.hThread);
        }

        Ok(WindowsChild {
            handle: info.hProcess,
            pid: info.dwProcessId,
        })
    }
}
