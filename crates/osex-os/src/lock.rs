//! Advisory byte-range locks.
//!
//! Locks never block: if another process holds a conflicting lock the call
//! fails with a native error. A `length` of 0 covers everything from
//! `offset` to the end of the file, including bytes appended later.

use osex_common::{Error, LockMode, NativeError, Result};
use std::fs::File;
use tracing::debug;

/// Applies `mode` to the range `offset..offset+length` of `file`.
pub fn lock(file: &File, mode: LockMode, offset: u64, length: u64) -> Result<()> {
    debug!("Applying {} lock at {}+{}", mode, offset, length);
    sys::set_lock(file, mode, offset, length).map_err(|e| Error::native(format!("{} lock", mode), e))
}

/// Releases the lock on `offset..offset+length` of `file`.
pub fn unlock(file: &File, offset: u64, length: u64) -> Result<()> {
    lock(file, LockMode::Unlock, offset, length)
}

#[cfg(unix)]
mod sys {
    use super::*;
    use nix::fcntl::{fcntl, FcntlArg};
    use std::os::fd::AsRawFd;

    pub(super) fn set_lock(
        file: &File,
        mode: LockMode,
        offset: u64,
        length: u64,
    ) -> std::result::Result<(), NativeError> {
        let l_type = match mode {
            LockMode::Read => libc::F_RDLCK,
            LockMode::Write => libc::F_WRLCK,
            LockMode::Unlock => libc::F_UNLCK,
        };
        let start = libc::off_t::try_from(offset).map_err(|_| NativeError::from_raw(libc::EINVAL))?;
        let len = libc::off_t::try_from(length).map_err(|_| NativeError::from_raw(libc::EINVAL))?;

        let mut flock: libc::flock = unsafe { std::mem::zeroed() };
        flock.l_type = l_type as libc::c_short;
        flock.l_whence = libc::SEEK_SET as libc::c_short;
        flock.l_start = start;
        flock.l_len = len;

        fcntl(file.as_raw_fd(), FcntlArg::F_SETLK(&flock))?;
        Ok(())
    }
}

#[cfg(windows)]
mod sys {
    use super::*;
    use std::os::windows::io::AsRawHandle;
    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::Storage::FileSystem::{
        LockFileEx, UnlockFileEx, LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY,
        LOCK_FILE_FLAGS,
    };
    use windows::Win32::System::IO::OVERLAPPED;

    pub(super) fn set_lock(
        file: &File,
        mode: LockMode,
        offset: u64,
        length: u64,
    ) -> std::result::Result<(), NativeError> {
        let handle = HANDLE(file.as_raw_handle());
        // No "to end of file" on Windows: lock the whole addressable range.
        let length = if length == 0 { u64::MAX } else { length };
        let (len_low, len_high) = (length as u32, (length >> 32) as u32);

        let mut overlapped = OVERLAPPED::default();
        unsafe {
            overlapped.Anonymous.Anonymous.Offset = offset as u32;
            overlapped.Anonymous.Anonymous.OffsetHigh = (offset >> 32) as u32;
            match mode {
                LockMode::Unlock => UnlockFileEx(handle, 0, len_low, len_high, &mut overlapped)?,
                LockMode::Read | LockMode::Write => {
                    let mut flags = LOCKFILE_FAIL_IMMEDIATELY;
                    if mode == LockMode::Write {
                        flags = LOCK_FILE_FLAGS(flags.0 | LOCKFILE_EXCLUSIVE_LOCK.0);
                    }
                    LockFileEx(handle, flags, 0, len_low, len_high, &mut overlapped)?
                }
            }
        }
        Ok(())
    }
}
