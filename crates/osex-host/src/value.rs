//! Dynamic values exchanged with the scripting host.

use crate::errors::{HostError, HostResult};
use osex_os::DirIter;
use osex_spawn::Process;
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::rc::Rc;

/// A host function: positional arguments in, results out.
pub type HostFunction = fn(&[Value]) -> HostResult;

/// Shared, mutable table reference.
pub type TableRef = Rc<RefCell<Table>>;

/// Any value the host can pass to or receive from OSEX.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Table(TableRef),
    Function(HostFunction),
    File(Rc<HostFile>),
    Process(Rc<RefCell<Process>>),
    Dir(Rc<RefCell<DirIter>>),
}

impl Value {
    /// Wraps `table` in a fresh shared reference.
    pub fn table(table: Table) -> Self {
        Value::Table(Rc::new(RefCell::new(table)))
    }

    pub fn file(file: File) -> Self {
        Value::File(Rc::new(HostFile::new(file)))
    }

    /// Host type name, as shown in argument errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Table(_) => "table",
            Value::Function(_) => "function",
            Value::File(_) | Value::Process(_) | Value::Dir(_) => "userdata",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String form of strings and numbers, the two types the host converts
    /// freely.
    pub fn to_host_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::table(t)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Table(t) => write!(f, "table: {:p}", Rc::as_ptr(t)),
            Value::Function(func) => write!(f, "function: {:p}", *func as *const ()),
            Value::File(file) => {
                if file.is_closed() {
                    write!(f, "file (closed)")
                } else {
                    write!(f, "file ({:p})", Rc::as_ptr(file))
                }
            }
            Value::Process(p) => write!(f, "{}", p.borrow()),
            Value::Dir(d) => write!(f, "directory iterator ({:p})", Rc::as_ptr(d)),
        }
    }
}

/// Formats a number the way the host prints it: integral values without a
/// fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// An open file owned by the host. Closing it makes later uses fail.
#[derive(Debug)]
pub struct HostFile {
    file: RefCell<Option<File>>,
}

impl HostFile {
    pub fn new(file: File) -> Self {
        Self {
            file: RefCell::new(Some(file)),
        }
    }

    /// Borrows the open file.
    pub fn get(&self) -> Result<Ref<'_, File>, HostError> {
        Ref::filter_map(self.file.borrow(), Option::as_ref)
            .map_err(|_| HostError::new("attempt to use a closed file"))
    }

    /// Closes the file, returning it if it was still open.
    pub fn close(&self) -> Option<File> {
        self.file.borrow_mut().take()
    }

    pub fn is_closed(&self) -> bool {
        self.file.borrow().is_none()
    }
}

/// A host table: a 1-based array part plus keyed entries.
#[derive(Debug, Clone, Default)]
pub struct Table {
    array: Vec<Value>,
    indexed: BTreeMap<i64, Value>,
    fields: BTreeMap<String, Value>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table whose array part is `values`.
    pub fn from_array<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut table = Self::new();
        for value in values {
            table.push(value);
        }
        table
    }

    /// Length of the array part.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty() && self.indexed.is_empty() && self.fields.is_empty()
    }

    /// The array part, starting at index 1.
    pub fn array(&self) -> &[Value] {
        &self.array
    }

    /// Appends to the array part.
    pub fn push(&mut self, value: impl Into<Value>) {
        let value = value.into();
        if !value.is_nil() {
            self.array.push(value);
            self.absorb_indexed();
        }
    }

    /// Value at integer key `index` (1-based array part, or any other
    /// integer key such as 0).
    pub fn get(&self, index: i64) -> Value {
        if index >= 1 && (index as usize) <= self.array.len() {
            return self.array[index as usize - 1].clone();
        }
        self.indexed.get(&index).cloned().unwrap_or(Value::Nil)
    }

    /// Sets integer key `index`; `Nil` removes it.
    pub fn set(&mut self, index: i64, value: impl Into<Value>) {
        let value = value.into();
        let len = self.array.len() as i64;
        if index >= 1 && index <= len {
            if value.is_nil() {
                let tail = self.array.split_off(index as usize - 1);
                for (offset, moved) in tail.into_iter().enumerate().skip(1) {
                    self.indexed.insert(index + offset as i64, moved);
                }
            } else {
                self.array[index as usize - 1] = value;
            }
        } else if index == len + 1 && !value.is_nil() {
            self.array.push(value);
            self.absorb_indexed();
        } else if value.is_nil() {
            self.indexed.remove(&index);
        } else {
            self.indexed.insert(index, value);
        }
    }

    fn absorb_indexed(&mut self) {
        while let Some(value) = self.indexed.remove(&(self.array.len() as i64 + 1)) {
            self.array.push(value);
        }
    }

    /// Value of named field `name`.
    pub fn field(&self, name: &str) -> Value {
        self.fields.get(name).cloned().unwrap_or(Value::Nil)
    }

    /// Sets named field `name`; `Nil` removes it.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if value.is_nil() {
            self.fields.remove(&name);
        } else {
            self.fields.insert(name, value);
        }
    }

    /// Named fields, in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Integer keys outside the array part, in key order.
    pub fn indexed(&self) -> impl Iterator<Item = (i64, &Value)> {
        self.indexed.iter().map(|(k, v)| (*k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_part_and_zero_index() {
        let mut table = Table::from_array(["a", "b"]);
        table.set(0, "zero");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).as_str(), Some("a"));
        assert_eq!(table.get(0).as_str(), Some("zero"));
        assert!(table.get(3).is_nil());
    }

    #[test]
    fn test_sparse_indexes_join_array_when_filled() {
        let mut table = Table::new();
        table.set(2, "second");
        assert_eq!(table.len(), 0);
        table.set(1, "first");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(2).as_str(), Some("second"));
    }

    #[test]
    fn test_removing_from_array_truncates_length() {
        let mut table = Table::from_array(["a", "b", "c"]);
        table.set(2, Value::Nil);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(3).as_str(), Some("c"));
    }

    #[test]
    fn test_fields() {
        let mut table = Table::new();
        table.set_field("command", "echo");
        assert_eq!(table.field("command").as_str(), Some("echo"));
        table.set_field("command", Value::Nil);
        assert!(table.field("command").is_nil());
        assert!(table.is_empty());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(Value::from(42).to_host_string().as_deref(), Some("42"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::table(Table::new()).type_name(), "table");
        let file = Value::file(tempfile::tempfile().unwrap());
        assert_eq!(file.type_name(), "userdata");
    }

    #[test]
    fn test_closed_file_cannot_be_used() {
        let file = HostFile::new(tempfile::tempfile().unwrap());
        assert!(file.get().is_ok());
        assert!(file.close().is_some());
        let err = file.get().unwrap_err();
        assert_eq!(err.to_string(), "attempt to use a closed file");
        assert!(file.close().is_none());
    }
}
