//! Validation of host spawn options.
//!
//! Accepted call forms:
//!
//! ```text
//! spawn("cmd")
//! spawn("cmd", {args = {"a1", "a2"}, env = {...}, stdin = f, ...})
//! spawn("cmd", {"a1", "a2", env = {...}})
//! spawn{command = "cmd", "a1", "a2", stdout = f}
//! spawn{"cmd", "a1", "a2"}
//! ```
//!
//! Everything is checked here, once, before any OS call.

use crate::errors::HostError;
use crate::value::{HostFile, Table, Value};
use osex_common::StdStream;
use osex_spawn::{ArgList, Environment};
use std::rc::Rc;

/// A fully validated spawn call.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub command: String,
    pub args: Option<ArgList>,
    pub env: Option<Environment>,
    pub redirects: Vec<(StdStream, Rc<HostFile>)>,
}

impl SpawnRequest {
    /// Validates the positional arguments of a `spawn` call.
    pub fn from_values(values: &[Value]) -> Result<Self, HostError> {
        match values.first() {
            Some(Value::String(command)) => match values.get(1) {
                None | Some(Value::Nil) => Ok(Self::bare(command.clone())),
                Some(Value::Table(options)) => {
                    let options = options.borrow();
                    let positional = options.array().to_vec();
                    Self::from_options(command.clone(), &options, positional)
                }
                Some(other) => Err(HostError::bad_argument(2, "spawn", "table", other.type_name())),
            },
            Some(Value::Table(options)) => {
                let options = options.borrow();
                let (command, positional) = match options.field("command") {
                    Value::Nil => {
                        // {cmd, arg1, ...}: the first array entry is the command.
                        let mut array = options.array().iter().cloned();
                        let command = array.next().unwrap_or(Value::Nil);
                        (command, array.collect())
                    }
                    command => (command, options.array().to_vec()),
                };
                let command = match command {
                    Value::String(command) => command,
                    other => {
                        return Err(HostError::new(format!(
                            "bad command option (string expected, got {})",
                            other.type_name()
                        )))
                    }
                };
                Self::from_options(command, &options, positional)
            }
            Some(other) => Err(HostError::bad_argument(
                1,
                "spawn",
                "string or table",
                other.type_name(),
            )),
            None => Err(HostError::bad_argument(1, "spawn", "string or table", "no value")),
        }
    }

    fn bare(command: String) -> Self {
        Self {
            command,
            args: None,
            env: None,
            redirects: Vec::new(),
        }
    }

    fn from_options(command: String, options: &Table, positional: Vec<Value>) -> Result<Self, HostError> {
        if command.is_empty() {
            return Err(HostError::new("no command specified"));
        }

        let args = match options.field("args") {
            Value::Nil => arg_list(&positional, options.get(0))?,
            Value::Table(table) => {
                if !positional.is_empty() {
                    return Err(HostError::new(
                        "cannot specify both the args option and array values",
                    ));
                }
                let table = table.borrow();
                arg_list(table.array(), table.get(0))?
            }
            other => {
                return Err(HostError::new(format!(
                    "bad args option (table expected, got {})",
                    other.type_name()
                )))
            }
        };

        let env = match options.field("env") {
            Value::Nil => None,
            Value::Table(table) => Some(environment(&table.borrow())?),
            other => {
                return Err(HostError::new(format!(
                    "bad env option (table expected, got {})",
                    other.type_name()
                )))
            }
        };

        let mut redirects = Vec::new();
        for stream in StdStream::ALL {
            match options.field(stream.name()) {
                Value::Nil => {}
                Value::File(file) => {
                    if file.is_closed() {
                        return Err(HostError::new("attempt to use a closed file"));
                    }
                    redirects.push((stream, file));
                }
                other => {
                    return Err(HostError::new(format!(
                        "bad {} option (file expected, got {})",
                        stream,
                        other.type_name()
                    )))
                }
            }
        }

        Ok(Self {
            command,
            args: Some(args),
            env,
            redirects,
        })
    }
}

fn arg_list(values: &[Value], arg0: Value) -> Result<ArgList, HostError> {
    let mut list = ArgList::default();
    for (i, value) in values.iter().enumerate() {
        match value.to_host_string() {
            Some(arg) => list.push(arg),
            None => {
                return Err(HostError::new(format!(
                    "bad args option (string expected at index {}, got {})",
                    i + 1,
                    value.type_name()
                )))
            }
        }
    }
    match arg0 {
        Value::Nil => Ok(list),
        other => match other.to_host_string() {
            Some(arg0) => Ok(list.with_arg0(arg0)),
            None => Err(HostError::new(format!(
                "bad args option (string expected at index 0, got {})",
                other.type_name()
            ))),
        },
    }
}

fn environment(table: &Table) -> Result<Environment, HostError> {
    if table.len() > 0 || table.indexed().next().is_some() {
        return Err(HostError::new("bad env option (string keys expected)"));
    }
    let mut env = Environment::new();
    for (name, value) in table.fields() {
        match value.to_host_string() {
            Some(value) => {
                env.set(name, value);
            }
            None => {
                return Err(HostError::new(format!(
                    "bad env option (string expected for {}, got {})",
                    name,
                    value.type_name()
                )))
            }
        }
    }
    env.validate()?;
    Ok(env)
}
