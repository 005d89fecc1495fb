//! Spawning through the host-facing functions.

use e2e_tests::testexe_command;
use osex_host::{functions, Table, Value};
use std::io::Read;

#[test]
fn test_host_spawn_with_array_form_and_env() {
    let ends = functions::pipe(&[]).unwrap();
    let (reader, writer) = (ends[0].clone(), ends[1].clone());

    let mut env = Table::new();
    env.set_field("OSEX_HOST_E2E", "yes");
    #[cfg(windows)]
    env.set_field("SystemRoot", std::env::var("SystemRoot").unwrap_or_default());

    let mut options = Table::from_array([testexe_command(), "--print-env".to_string()]);
    options.set_field("env", env);
    options.set_field("stdout", writer.clone());

    let process = functions::spawn(&[Value::table(options)]).unwrap()[0].clone();
    if let Value::File(writer) = &writer {
        writer.close();
    }

    let mut output = String::new();
    if let Value::File(reader) = &reader {
        (&*reader.get().unwrap()).read_to_string(&mut output).unwrap();
    }
    assert!(output.lines().any(|line| line == "OSEX_HOST_E2E=yes"), "{}", output);

    let code = functions::wait(&[process]).unwrap();
    assert_eq!(code[0].as_number(), Some(0.0));
}

#[test]
fn test_host_spawn_exit_code() {
    let mut options = Table::new();
    options.set_field("args", Table::from_array(["--exit-code", "9"]));
    let process = functions::spawn(&[testexe_command().into(), Value::table(options)]).unwrap()[0].clone();
    assert_eq!(functions::wait(&[process]).unwrap()[0].as_number(), Some(9.0));
}
