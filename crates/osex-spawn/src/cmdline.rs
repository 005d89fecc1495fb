//! Windows command-line builder.
//!
//! `CreateProcess` takes a single command-line string that the child
//! splits back into arguments. The command and each argument are joined
//! with spaces; any piece containing a space that is not already quoted is
//! wrapped in double quotes.
//!
//! Embedded double quotes are NOT escaped: an argument such as `say "hi"`
//! produces an ambiguous command line. Callers needing exact round-trips on
//! Windows must avoid quote characters in arguments.

use crate::args::ArgList;

/// Whether `s` must be wrapped in quotes to survive as one argument.
pub fn needs_quoting(s: &str) -> bool {
    !s.starts_with('"') && s.contains(' ')
}

fn push_piece(line: &mut String, piece: &str) {
    if needs_quoting(piece) {
        line.push('"');
        line.push_str(piece);
        line.push('"');
    } else {
        line.push_str(piece);
    }
}

/// The command line used when the caller supplies no arguments.
pub fn default_command_line(command: &str) -> String {
    let mut line = String::with_capacity(command.len() + 2);
    push_piece(&mut line, command);
    line
}

/// Builds `command arg1 arg2 ...` with Windows quoting.
///
/// The list's `arg0` override has no Windows equivalent and is ignored:
/// the child always sees the command line as given.
pub fn build_command_line(command: &str, list: &ArgList) -> String {
    let mut line = default_command_line(command);
    for arg in list.args() {
        line.push(' ');
        push_piece(&mut line, arg);
    }
    line
}
