//! Sleeping.

use osex_common::{Error, Result};
use std::time::Duration;

/// Suspends the calling thread for `seconds`, which may be fractional.
pub fn sleep(seconds: f64) -> Result<()> {
    let duration = Duration::try_from_secs_f64(seconds)
        .map_err(|_| Error::configuration(format!("invalid sleep duration: {}", seconds)))?;
    std::thread::sleep(duration);
    Ok(())
}
