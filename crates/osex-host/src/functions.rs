//! Host functions.
//!
//! Each function takes the host's positional arguments and returns the
//! host's results, following the `(nil, message)` convention for OS
//! failures.

use crate::errors::{fail_pair, host_result, success, HostError, HostResult};
use crate::options::SpawnRequest;
use crate::value::{HostFile, Table, Value};
use osex_common::{LockMode, StdStream};
use osex_os::{DirEntry, DirentTarget, EntryInfo};
use osex_spawn::SpawnOptions;
use std::cell::{Ref, RefCell};
use std::fs::File;
use std::rc::Rc;
use tracing::debug;

fn arg(args: &[Value], position: usize) -> Value {
    args.get(position - 1).cloned().unwrap_or(Value::Nil)
}

fn got(args: &[Value], position: usize) -> &'static str {
    match args.get(position - 1) {
        Some(value) => value.type_name(),
        None => "no value",
    }
}

fn check_string(args: &[Value], position: usize, function: &str) -> Result<String, HostError> {
    arg(args, position)
        .to_host_string()
        .ok_or_else(|| HostError::bad_argument(position, function, "string", got(args, position)))
}

fn check_number(args: &[Value], position: usize, function: &str) -> Result<f64, HostError> {
    arg(args, position)
        .as_number()
        .ok_or_else(|| HostError::bad_argument(position, function, "number", got(args, position)))
}

fn opt_offset(args: &[Value], position: usize, function: &str) -> Result<u64, HostError> {
    match arg(args, position) {
        Value::Nil => Ok(0),
        Value::Number(n) if n >= 0.0 && n.is_finite() => Ok(n as u64),
        Value::Number(_) => Err(HostError::bad_argument(
            position,
            function,
            "non-negative number",
            "number",
        )),
        _ => Err(HostError::bad_argument(position, function, "number", got(args, position))),
    }
}

fn check_file(args: &[Value], position: usize, function: &str) -> Result<Rc<HostFile>, HostError> {
    match arg(args, position) {
        Value::File(file) => Ok(file),
        _ => Err(HostError::bad_argument(position, function, "file", got(args, position))),
    }
}

fn entry_table(table: &mut Table, info: EntryInfo) {
    table.set_field("type", info.kind.as_str());
    table.set_field("size", info.size);
}

/// `getenv(name) -> value | nil, message`
pub fn getenv(args: &[Value]) -> HostResult {
    let name = check_string(args, 1, "getenv")?;
    host_result(osex_os::getenv(&name), |value| vec![value.into()])
}

/// `setenv(name [, value]) -> true | nil, message`; no value unsets.
pub fn setenv(args: &[Value]) -> HostResult {
    let name = check_string(args, 1, "setenv")?;
    let value = match arg(args, 2) {
        Value::Nil => None,
        other => Some(
            other
                .to_host_string()
                .ok_or_else(|| HostError::bad_argument(2, "setenv", "string", other.type_name()))?,
        ),
    };
    host_result(osex_os::setenv(&name, value.as_deref()), |_| success())
}

/// `unsetenv(name) -> true | nil, message`
pub fn unsetenv(args: &[Value]) -> HostResult {
    let name = check_string(args, 1, "unsetenv")?;
    host_result(osex_os::unsetenv(&name), |_| success())
}

/// `environ() -> table`
pub fn environ(_args: &[Value]) -> HostResult {
    host_result(osex_os::environ(), |vars| {
        let mut table = Table::new();
        for (name, value) in vars {
            table.set_field(name, value);
        }
        vec![table.into()]
    })
}

/// `sleep(seconds)`
pub fn sleep(args: &[Value]) -> HostResult {
    let seconds = check_number(args, 1, "sleep")?;
    host_result(osex_os::sleep(seconds), |_| Vec::new())
}

/// `chdir(path) -> true | nil, message`
pub fn chdir(args: &[Value]) -> HostResult {
    let path = check_string(args, 1, "chdir")?;
    host_result(osex_os::chdir(&path), |_| success())
}

/// `mkdir(path) -> true | nil, message`
pub fn mkdir(args: &[Value]) -> HostResult {
    let path = check_string(args, 1, "mkdir")?;
    host_result(osex_os::mkdir(&path), |_| success())
}

/// `currentdir() -> path | nil, message`
pub fn currentdir(_args: &[Value]) -> HostResult {
    host_result(osex_os::currentdir(), |path| {
        vec![path.to_string_lossy().into_owned().into()]
    })
}

/// `dir(path) -> dirnext, iterator | nil, message`
///
/// Use as a generic-for triple: call `dirnext(iterator)` until it returns
/// nil.
pub fn dir(args: &[Value]) -> HostResult {
    let path = check_string(args, 1, "dir")?;
    host_result(osex_os::dir(&path), |iter| {
        vec![
            Value::Function(dirnext),
            Value::Dir(Rc::new(RefCell::new(iter))),
        ]
    })
}

/// `dirnext(iterator) -> {name, type, size} | nil | nil, message`
pub fn dirnext(args: &[Value]) -> HostResult {
    let iter = match arg(args, 1) {
        Value::Dir(iter) => iter,
        _ => return Err(HostError::bad_argument(1, "dirnext", "directory iterator", got(args, 1))),
    };
    let next = iter.borrow_mut().next();
    match next {
        None => Ok(vec![Value::Nil]),
        Some(Ok(DirEntry { name, kind, size })) => {
            let mut table = Table::new();
            table.set_field("name", name);
            entry_table(&mut table, EntryInfo { kind, size });
            Ok(vec![table.into()])
        }
        Some(Err(err)) => Ok(fail_pair(&err)),
    }
}

/// `dirent(path | file [, table]) -> {type, size} | nil, message`
///
/// When a table is passed as the second argument it is filled and
/// returned instead of a new one.
pub fn dirent(args: &[Value]) -> HostResult {
    let info = match arg(args, 1) {
        Value::String(path) => osex_os::dirent(path.as_str()),
        Value::File(file) => {
            let file = file.get()?;
            osex_os::dirent(DirentTarget::File(&file))
        }
        _ => {
            return Err(HostError::bad_argument(
                1,
                "dirent",
                "file or pathname",
                got(args, 1),
            ))
        }
    };
    let target = match arg(args, 2) {
        Value::Table(table) => table,
        _ => Rc::new(RefCell::new(Table::new())),
    };
    host_result(info, |info| {
        entry_table(&mut target.borrow_mut(), info);
        vec![Value::Table(target.clone())]
    })
}

/// `lock(file, mode [, offset [, length]]) -> true | nil, message`
pub fn lock(args: &[Value]) -> HostResult {
    let file = check_file(args, 1, "lock")?;
    let mode = LockMode::parse(&check_string(args, 2, "lock")?)?;
    let offset = opt_offset(args, 3, "lock")?;
    let length = opt_offset(args, 4, "lock")?;
    let file = file.get()?;
    host_result(osex_os::lock(&file, mode, offset, length), |_| success())
}

/// `unlock(file [, offset [, length]]) -> true | nil, message`
pub fn unlock(args: &[Value]) -> HostResult {
    let file = check_file(args, 1, "unlock")?;
    let offset = opt_offset(args, 2, "unlock")?;
    let length = opt_offset(args, 3, "unlock")?;
    let file = file.get()?;
    host_result(osex_os::unlock(&file, offset, length), |_| success())
}

/// `pipe() -> read_end, write_end | nil, message`
pub fn pipe(_args: &[Value]) -> HostResult {
    host_result(osex_os::pipe(), |(reader, writer)| {
        vec![Value::file(reader), Value::file(writer)]
    })
}

/// `spawn(command [, options]) -> process | nil, message`
pub fn spawn(args: &[Value]) -> HostResult {
    let request = SpawnRequest::from_values(args)?;
    debug!("Host spawn request: {}", request.command);

    let guards: Vec<(StdStream, Ref<'_, File>)> = request
        .redirects
        .iter()
        .map(|(stream, file)| -> Result<_, HostError> { Ok((*stream, file.get()?)) })
        .collect::<Result<_, HostError>>()?;

    let mut options = SpawnOptions::new();
    if let Some(list) = &request.args {
        options = options.args(list.clone());
    }
    if let Some(env) = &request.env {
        options = options.env(env.clone());
    }
    for (stream, file) in &guards {
        let target: &File = file;
        options = options.redirect(*stream, target);
    }

    host_result(osex_spawn::spawn(&request.command, &options), |process| {
        vec![Value::Process(Rc::new(RefCell::new(process)))]
    })
}

/// `wait(process) -> exit_code | nil, message`
pub fn wait(args: &[Value]) -> HostResult {
    let process = match arg(args, 1) {
        Value::Process(process) => process,
        _ => return Err(HostError::bad_argument(1, "wait", "process", got(args, 1))),
    };
    let result = process.borrow_mut().wait();
    host_result(result, |code| vec![code.into()])
}
