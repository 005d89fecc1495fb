//! Function tables and namespace installation.

use crate::errors::HostError;
use crate::functions;
use crate::value::{HostFunction, Table, TableRef, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// Operations that also extend the host's `os` table.
pub const OS_FUNCTIONS: &[(&str, HostFunction)] = &[
    ("getenv", functions::getenv),
    ("setenv", functions::setenv),
    ("unsetenv", functions::unsetenv),
    ("environ", functions::environ),
    ("sleep", functions::sleep),
    ("chdir", functions::chdir),
    ("mkdir", functions::mkdir),
    ("currentdir", functions::currentdir),
    ("dir", functions::dir),
    ("dirent", functions::dirent),
    ("spawn", functions::spawn),
];

/// Operations that also extend the host's `io` table.
pub const IO_FUNCTIONS: &[(&str, HostFunction)] = &[("pipe", functions::pipe)];

/// Operations only reachable through `ex`.
pub const EX_ONLY_FUNCTIONS: &[(&str, HostFunction)] = &[
    ("lock", functions::lock),
    ("unlock", functions::unlock),
    ("wait", functions::wait),
    ("dirnext", functions::dirnext),
];

/// Builds the `ex` table holding every operation.
pub fn ex_table() -> Table {
    let mut ex = Table::new();
    for (name, function) in IO_FUNCTIONS
        .iter()
        .chain(OS_FUNCTIONS)
        .chain(EX_ONLY_FUNCTIONS)
    {
        ex.set_field(*name, Value::Function(*function));
    }
    ex
}

/// Copies `names` from `from` into `to`, falling back to the built-in
/// function when `from` lacks one.
fn copy_fields(functions: &[(&str, HostFunction)], from: &Table, to: &mut Table) {
    for (name, function) in functions {
        let value = match from.field(name) {
            Value::Nil => Value::Function(*function),
            value => value,
        };
        to.set_field(*name, value);
    }
}

fn global_table(globals: &Table, name: &str) -> Result<TableRef, HostError> {
    match globals.field(name) {
        Value::Table(table) => Ok(table),
        _ => Err(HostError::new(format!("{} not loaded", name))),
    }
}

/// Installs the library into `globals`.
///
/// Sets `globals.ex`, then copies the environment, directory and process
/// operations into `globals.os` and `pipe` into `globals.io`. Both tables
/// must already exist. Returns the `ex` table.
pub fn install(globals: &TableRef) -> Result<TableRef, HostError> {
    let ex = Rc::new(RefCell::new(ex_table()));
    globals.borrow_mut().set_field("ex", Value::Table(ex.clone()));

    let os = global_table(&globals.borrow(), "os")?;
    copy_fields(OS_FUNCTIONS, &ex.borrow(), &mut os.borrow_mut());

    let io = global_table(&globals.borrow(), "io")?;
    copy_fields(IO_FUNCTIONS, &ex.borrow(), &mut io.borrow_mut());

    info!("Installed ex library");
    Ok(ex)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globals_with(names: &[&str]) -> TableRef {
        let mut globals = Table::new();
        for name in names {
            globals.set_field(*name, Table::new());
        }
        Rc::new(RefCell::new(globals))
    }

    #[test]
    fn test_ex_table_has_every_operation() {
        let ex = ex_table();
        for name in [
            "getenv", "setenv", "unsetenv", "environ", "sleep", "chdir", "mkdir",
            "currentdir", "dir", "dirnext", "dirent", "lock", "unlock", "pipe", "spawn", "wait",
        ] {
            assert!(matches!(ex.field(name), Value::Function(_)), "missing {}", name);
        }
    }

    #[test]
    fn test_install_extends_os_and_io() {
        let globals = globals_with(&["os", "io"]);
        install(&globals).unwrap();

        let globals = globals.borrow();
        assert!(matches!(globals.field("ex"), Value::Table(_)));

        let os = globals.field("os");
        let os = os.as_table().unwrap().borrow();
        assert!(matches!(os.field("spawn"), Value::Function(_)));
        assert!(matches!(os.field("getenv"), Value::Function(_)));
        assert!(os.field("pipe").is_nil());
        assert!(os.field("lock").is_nil());

        let io = globals.field("io");
        let io = io.as_table().unwrap().borrow();
        assert!(matches!(io.field("pipe"), Value::Function(_)));
    }

    #[test]
    fn test_install_requires_os() {
        let err = install(&globals_with(&["io"])).unwrap_err();
        assert_eq!(err.message(), "os not loaded");
    }

    #[test]
    fn test_install_requires_io() {
        let err = install(&globals_with(&["os"])).unwrap_err();
        assert_eq!(err.message(), "io not loaded");
    }
}
