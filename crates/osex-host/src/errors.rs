//! Host-boundary errors and the result-pair convention.
//!
//! Host functions fail in two ways:
//! - misuse (wrong argument types, conflicting options) is raised as an
//!   `Err(HostError)`, the host's equivalent of a thrown error;
//! - OS failures are ordinary results: the pair `(nil, message)`.

use crate::value::Value;
use osex_common::Error;
use thiserror::Error;

/// A raised host error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// `bad argument #<n> to '<function>' (<expected> expected, got <actual>)`
    pub fn bad_argument(position: usize, function: &str, expected: &str, got: &str) -> Self {
        Self::new(format!(
            "bad argument #{} to '{}' ({} expected, got {})",
            position, function, expected, got
        ))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for HostError {
    fn from(err: Error) -> Self {
        match err {
            Error::Configuration { message } => Self::new(message),
            other => Self::new(other.to_string()),
        }
    }
}

/// Results of a host function call.
pub type HostResult = std::result::Result<Vec<Value>, HostError>;

/// Maps an OSEX result onto the host convention.
///
/// Success goes through `on_ok`; configuration errors are raised; every
/// other failure becomes `(nil, message)`.
pub fn host_result<T>(result: osex_common::Result<T>, on_ok: impl FnOnce(T) -> Vec<Value>) -> HostResult {
    match result {
        Ok(value) => Ok(on_ok(value)),
        Err(err) if err.is_configuration() => Err(HostError::from(err)),
        Err(err) => Ok(fail_pair(&err)),
    }
}

/// The `(nil, message)` pair.
pub fn fail_pair(err: &Error) -> Vec<Value> {
    vec![Value::Nil, Value::String(err.to_string())]
}

/// The single `true` result of an operation without a value.
pub fn success() -> Vec<Value> {
    vec![Value::Boolean(true)]
}
