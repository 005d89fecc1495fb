//! Environment mappings and their native encodings.
//!
//! A spawn either inherits the parent's environment (no mapping at all) or
//! replaces it with an explicit [`Environment`], which may be empty. The
//! two are different: an empty mapping gives the child no variables.
//!
//! Encodings:
//! - POSIX: one `NAME=VALUE` C string per entry, null-terminated at execute
//!   time.
//! - Windows: a single UTF-16 block, `NAME=VALUE\0...\0\0`.

use crate::args::to_cstring;
use osex_common::{Error, Result};
use std::collections::btree_map::{self, BTreeMap};
use std::ffi::CString;

/// An explicit name→value environment for a child process.
///
/// Entries are kept sorted by name, which is also the encoding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn current() -> Self {
        let _env_lock = osex_common::env_read_lock();
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Removes `name`, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.vars.iter()
    }

    /// Checks every entry can be handed to the OS.
    ///
    /// Names must be non-empty and free of `=` and NUL; values must be free
    /// of NUL.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.vars {
            validate_entry(name, value)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

fn validate_entry(name: &str, value: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::configuration("environment variable name cannot be empty"));
    }
    if name.contains('=') || name.contains('\0') {
        return Err(Error::configuration(format!(
            "environment variable name is not representable: {:?}",
            name
        )));
    }
    if value.contains('\0') {
        return Err(Error::configuration(format!(
            "environment variable {} has a value with an embedded NUL",
            name
        )));
    }
    Ok(())
}

/// Builds the owned `NAME=VALUE` strings behind a POSIX `envp`.
pub fn build_envp(env: &Environment) -> Result<Vec<CString>> {
    env.validate()?;
    env.iter()
        .map(|(name, value)| to_cstring(&format!("{}={}", name, value), "environment entry"))
        .collect()
}

/// Builds a Windows environment block: UTF-16 `NAME=VALUE` entries, each
/// NUL-terminated, followed by a final NUL.
pub fn build_env_block(env: &Environment) -> Result<Vec<u16>> {
    env.validate()?;
    let mut block: Vec<u16> = Vec::new();
    // An empty block still needs two terminators.
    if env.is_empty() {
        block.push(0);
    }
    for (name, value) in env {
        block.extend(name.encode_utf16());
        block.push('=' as u16);
        block.extend(value.encode_utf16());
        block.push(0);
    }
    block.push(0);
    Ok(block)
}
