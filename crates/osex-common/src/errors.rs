//! Error types for OSEX.
//!
//! Two families of failure are kept apart on purpose:
//!
//! - **Configuration errors** are detected before any OS call is made (bad
//!   option types, conflicting arguments, unrepresentable environment
//!   entries). They never reach the native layer.
//! - **Native errors** come back from the OS. They always carry the raw
//!   error code together with the OS-supplied description.
//!
//! ```rust
//! use osex_common::{Error, Result};
//!
//! fn check_mode(mode: &str) -> Result<()> {
//!     if mode.is_empty() {
//!         return Err(Error::configuration("invalid mode"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_mode("").unwrap_err().is_configuration());
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for OSEX operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for OSEX operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input detected before any OS call.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A builder step was applied out of order.
    #[error("Invalid stage: expected {expected}, got {actual}")]
    InvalidStage { expected: String, actual: String },

    /// The OS rejected an operation.
    #[error("{operation}: {source}")]
    Native {
        operation: String,
        #[source]
        source: NativeError,
    },

    /// A requested resource does not exist.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// I/O error (wraps std::io::Error).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error with context.
    #[error("{message}: {source}")]
    WithContext {
        message: String,
        source: Box<Error>,
    },
}

impl Error {
    /// Creates a Configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an InvalidStage error.
    pub fn invalid_stage(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidStage {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a Native error for `operation`.
    pub fn native(operation: impl Into<String>, source: NativeError) -> Self {
        Self::Native {
            operation: operation.into(),
            source,
        }
    }

    /// Creates a Native error for `operation` from a std I/O failure.
    pub fn native_io(operation: impl Into<String>, err: &io::Error) -> Self {
        Self::native(operation, NativeError::from_io(err))
    }

    /// Creates a NotFound error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Adds context to an error.
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::WithContext {
            message: message.into(),
            source: Box::new(self),
        }
    }

    /// True for errors raised before reaching the OS.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration { .. } | Self::InvalidStage { .. } => true,
            Self::WithContext { source, .. } => source.is_configuration(),
            _ => false,
        }
    }

    /// The raw OS error code, if this error came from the OS.
    pub fn native_code(&self) -> Option<i32> {
        match self {
            Self::Native { source, .. } => Some(source.code()),
            Self::Io(e) => e.raw_os_error(),
            Self::WithContext { source, .. } => source.native_code(),
            _ => None,
        }
    }
}

// Convenience methods for Result types
pub trait ResultExt<T> {
    /// Adds context to an error result.
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(message))
    }
}

/// A native OS error: the raw code plus the OS-supplied description.
///
/// Rendered as `"<description> (os error <code>)"`, never as a bare number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    code: i32,
    message: String,
}

impl NativeError {
    /// Builds an error from a raw OS code (errno or Win32 error code).
    pub fn from_raw(code: i32) -> Self {
        Self {
            code,
            message: describe(code),
        }
    }

    /// Builds an error from the calling thread's last OS error.
    pub fn last() -> Self {
        Self::from_io(&io::Error::last_os_error())
    }

    /// Builds an error from a std I/O error.
    ///
    /// I/O errors without an OS code (synthesized by std) keep code `-1`.
    pub fn from_io(err: &io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => Self::from_raw(code),
            None => Self {
                code: -1,
                message: err.to_string(),
            },
        }
    }

    /// The raw OS error code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The OS-supplied description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (os error {})", self.message, self.code)
    }
}

impl std::error::Error for NativeError {}

#[cfg(unix)]
impl From<nix::errno::Errno> for NativeError {
    fn from(errno: nix::errno::Errno) -> Self {
        Self::from_raw(errno as i32)
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for NativeError {
    fn from(err: windows::core::Error) -> Self {
        // HRESULT_FROM_WIN32 wraps Win32 codes as 0x8007xxxx.
        let hr = err.code().0 as u32;
        let code = if hr & 0xFFFF_0000 == 0x8007_0000 {
            (hr & 0xFFFF) as i32
        } else {
            hr as i32
        };
        Self::from_raw(code)
    }
}

/// OS description for `code`, without std's "(os error N)" suffix.
fn describe(code: i32) -> String {
    let text = io::Error::from_raw_os_error(code).to_string();
    let suffix = format!(" (os error {})", code);
    match text.strip_suffix(&suffix) {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let err = Error::configuration("cannot specify both the args option and array values");
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "Configuration error: cannot specify both the args option and array values"
        );
    }

    #[test]
    fn test_error_context() {
        let err = Error::not_found("HOME").context("Failed to read environment");
        let message = err.to_string();
        assert!(message.contains("Failed to read environment"));
        assert!(message.contains("HOME"));
    }

    #[test]
    fn test_context_keeps_configuration_kind() {
        let err = Error::invalid_stage("filename-set", "env-set").context("spawn");
        assert!(err.is_configuration());
    }

    #[cfg(unix)]
    #[test]
    fn test_native_error_carries_code_and_text() {
        let err = Error::native("spawn nonexistent", NativeError::from_raw(libc_enoent()));
        assert!(!err.is_configuration());
        assert_eq!(err.native_code(), Some(libc_enoent()));
        let message = err.to_string();
        assert!(message.starts_with("spawn nonexistent: "));
        assert!(message.contains("No such file or directory"), "{}", message);
        assert!(message.ends_with(&format!("(os error {})", libc_enoent())));
    }

    #[cfg(unix)]
    #[test]
    fn test_native_error_from_errno() {
        let native = NativeError::from(nix::errno::Errno::EACCES);
        assert_eq!(native.code(), nix::errno::Errno::EACCES as i32);
        assert!(!native.message().contains("os error"));
    }

    #[test]
    fn test_native_error_from_synthetic_io() {
        let io_err = io::Error::new(io::ErrorKind::Other, "synthetic");
        let native = NativeError::from_io(&io_err);
        assert_eq!(native.code(), -1);
        assert_eq!(native.message(), "synthetic");
    }

    #[cfg(unix)]
    fn libc_enoent() -> i32 {
        nix::errno::Errno::ENOENT as i32
    }
}
