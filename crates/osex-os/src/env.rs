//! Environment variable access.
//!
//! Every read and write goes through the process-wide environment lock, so
//! a concurrent spawn that inherits the environment never observes a
//! half-updated block.

use osex_common::{env_read_lock, env_write_lock, Error, Result};
use std::collections::BTreeMap;
use tracing::debug;

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(Error::configuration(format!(
            "invalid environment variable name: {:?}",
            name
        )));
    }
    Ok(())
}

/// Returns the value of `name`.
///
/// An unset variable is [`Error::NotFound`]. Values that are not valid
/// Unicode are converted lossily.
pub fn getenv(name: &str) -> Result<String> {
    check_name(name)?;
    let _env_lock = env_read_lock();
    match std::env::var_os(name) {
        Some(value) => Ok(value.to_string_lossy().into_owned()),
        None => Err(Error::not_found(name)),
    }
}

/// Sets `name` to `value`, or removes it when `value` is `None`.
pub fn setenv(name: &str, value: Option<&str>) -> Result<()> {
    check_name(name)?;
    if let Some(value) = value {
        if value.contains('\0') {
            return Err(Error::configuration(format!(
                "environment variable {} has a value with an embedded NUL",
                name
            )));
        }
    }

    let _env_lock = env_write_lock();
    match value {
        Some(value) => {
            debug!("Setting environment variable: {}", name);
            std::env::set_var(name, value);
        }
        None => {
            debug!("Removing environment variable: {}", name);
            std::env::remove_var(name);
        }
    }
    Ok(())
}

/// Removes `name` from the environment. Removing an unset name succeeds.
pub fn unsetenv(name: &str) -> Result<()> {
    setenv(name, None)
}

/// Snapshot of the whole environment.
pub fn environ() -> Result<BTreeMap<String, String>> {
    let _env_lock = env_read_lock();
    Ok(std::env::vars_os()
        .map(|(name, value)| {
            (
                name.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect())
}
