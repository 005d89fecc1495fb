//! Anonymous pipes.
//!
//! Both ends are close-on-exec (non-inheritable on Windows), so a spawned
//! child only gets an end that is explicitly redirected into it.

use osex_common::{Error, Result};
use std::fs::File;
use tracing::debug;

/// Creates a pipe, returning `(read_end, write_end)`.
pub fn pipe() -> Result<(File, File)> {
    let (reader, writer) = sys::pipe().map_err(|e| Error::native("pipe", e))?;
    debug!("Created pipe");
    Ok((reader, writer))
}

#[cfg(all(unix, not(target_vendor = "apple")))]
mod sys {
    use nix::fcntl::OFlag;
    use osex_common::NativeError;
    use std::fs::File;

    /// Both ends are created close-on-exec in one call, so a spawn on
    /// another thread never sees them.
    pub(super) fn pipe() -> Result<(File, File), NativeError> {
        let (reader, writer) = nix::unistd::pipe2(OFlag::O_CLOEXEC)?;
        Ok((File::from(reader), File::from(writer)))
    }
}

// No pipe2 on Apple targets. A spawn racing between pipe() and the fcntl
// calls can still inherit the ends there.
#[cfg(target_vendor = "apple")]
mod sys {
    use nix::fcntl::{fcntl, FcntlArg, FdFlag};
    use osex_common::NativeError;
    use std::fs::File;
    use std::os::fd::{AsRawFd, OwnedFd};

    fn close_on_exec(fd: &OwnedFd) -> Result<(), NativeError> {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
        Ok(())
    }

    pub(super) fn pipe() -> Result<(File, File), NativeError> {
        let (reader, writer) = nix::unistd::pipe()?;
        close_on_exec(&reader)?;
        close_on_exec(&writer)?;
        Ok((File::from(reader), File::from(writer)))
    }
}

#[cfg(windows)]
mod sys {
    use osex_common::NativeError;
    use std::fs::File;
    use std::os::windows::io::{FromRawHandle, OwnedHandle};
    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::System::Pipes::CreatePipe;

    pub(super) fn pipe() -> Result<(File, File), NativeError> {
        let mut reader = HANDLE::default();
        let mut writer = HANDLE::default();
        unsafe {
            // No security attributes: neither end is inheritable.
            CreatePipe(&mut reader, &mut writer, None, 0)?;
            let reader = OwnedHandle::from_raw_handle(reader.0);
            let writer = OwnedHandle::from_raw_handle(writer.0);
            Ok((File::from(reader), File::from(writer)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_pipe_round_trip() {
        let (mut reader, mut writer) = pipe().unwrap();
        writer.write_all(b"through the pipe").unwrap();
        drop(writer);
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert_eq!(text, "through the pipe");
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_ends_are_close_on_exec() {
        use nix::fcntl::{fcntl, FcntlArg, FdFlag};
        use std::os::fd::AsRawFd;

        let (reader, writer) = pipe().unwrap();
        for file in [&reader, &writer] {
            let flags = fcntl(file.as_raw_fd(), FcntlArg::F_GETFD).unwrap();
            assert!(FdFlag::from_bits_truncate(flags).contains(FdFlag::FD_CLOEXEC));
        }
    }
}
