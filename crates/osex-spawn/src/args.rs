//! Argument lists and the POSIX argument vector builder.
//!
//! An [`ArgList`] is the argv-style list a caller hands to a spawn: an
//! optional 0-index entry (`arg0`) followed by the real arguments. When
//! `arg0` is absent or empty the command itself takes its place.

use osex_common::{Error, Result};
use std::ffi::CString;

/// The argv-style argument list of a spawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList {
    arg0: Option<String>,
    args: Vec<String>,
}

impl ArgList {
    /// Creates a list from the arguments following `argv[0]`.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            arg0: None,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Overrides the 0-index entry the child sees as its own name.
    pub fn with_arg0(mut self, arg0: impl Into<String>) -> Self {
        self.arg0 = Some(arg0.into());
        self
    }

    /// The explicit 0-index entry, if any.
    pub fn arg0(&self) -> Option<&str> {
        self.arg0.as_deref()
    }

    /// Arguments following `argv[0]`.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Appends one argument.
    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ArgList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Builds the owned strings behind a POSIX `argv`.
///
/// The result is `[arg0-or-command, args...]`. The null-terminated pointer
/// array is assembled from this storage at execute time.
pub fn build_argv(command: &str, list: &ArgList) -> Result<Vec<CString>> {
    let arg0 = match list.arg0() {
        Some(arg0) if !arg0.is_empty() => arg0,
        _ => command,
    };
    let mut argv = Vec::with_capacity(list.args.len() + 1);
    argv.push(to_cstring(arg0, "argument")?);
    for arg in &list.args {
        argv.push(to_cstring(arg, "argument")?);
    }
    Ok(argv)
}

/// The argument vector used when the caller supplies no arguments.
pub fn default_argv(command: &str) -> Result<Vec<CString>> {
    Ok(vec![to_cstring(command, "command")?])
}

pub(crate) fn to_cstring(value: &str, what: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| Error::configuration(format!("{} contains an embedded NUL: {:?}", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(argv: &[CString]) -> Vec<&str> {
        argv.iter().map(|s| s.to_str().unwrap()).collect()
    }

    #[test]
    fn test_command_becomes_arg0() {
        let argv = build_argv("echo", &ArgList::new(["hello", "world"])).unwrap();
        assert_eq!(strings(&argv), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn test_explicit_arg0_is_kept() {
        let list = ArgList::new(["-c", "true"]).with_arg0("-sh");
        let argv = build_argv("/bin/sh", &list).unwrap();
        assert_eq!(strings(&argv), vec!["-sh", "-c", "true"]);
    }

    #[test]
    fn test_empty_arg0_falls_back_to_command() {
        let list = ArgList::new(["x"]).with_arg0("");
        let argv = build_argv("cat", &list).unwrap();
        assert_eq!(strings(&argv), vec!["cat", "x"]);
    }

    #[test]
    fn test_zero_arguments() {
        let argv = build_argv("true", &ArgList::default()).unwrap();
        assert_eq!(strings(&argv), vec!["true"]);
        assert_eq!(strings(&default_argv("true").unwrap()), vec!["true"]);
    }

    #[test]
    fn test_arguments_with_spaces_are_untouched() {
        let argv = build_argv("printf", &ArgList::new(["a b", "\"q\""])).unwrap();
        assert_eq!(strings(&argv), vec!["printf", "a b", "\"q\""]);
    }

    #[test]
    fn test_embedded_nul_is_a_configuration_error() {
        let err = build_argv("echo", &ArgList::new(["bad\0arg"])).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_collect_into_arg_list() {
        let mut list: ArgList = vec!["a", "b"].into_iter().collect();
        list.push("c");
        assert_eq!(list.args(), &["a", "b", "c"]);
        assert!(list.arg0().is_none());
    }
}
