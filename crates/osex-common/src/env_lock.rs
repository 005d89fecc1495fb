//! Process-wide lock around the environment block.
//!
//! `setenv`/`unsetenv` rewrite the block the OS hands to children that
//! inherit it. Writers take the write lock; a spawn that passes the live
//! environment to the OS holds the read lock across the native call.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

static ENV_LOCK: RwLock<()> = RwLock::new(());

/// Shared access to the current environment block.
pub fn env_read_lock() -> RwLockReadGuard<'static, ()> {
    ENV_LOCK.read()
}

/// Exclusive access, held while the environment block is modified.
pub fn env_write_lock() -> RwLockWriteGuard<'static, ()> {
    ENV_LOCK.write()
}
