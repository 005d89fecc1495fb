//! Exit status reporting and redirects.

use e2e_tests::{run_testexe, testexe_command, wait_for};
use osex_spawn::{spawn, ArgList, ProcessStatus, SpawnOptions};
use std::io::{Read, Write};

#[test]
fn test_exit_code_is_reported() {
    let run = run_testexe(ArgList::new(["--exit-code", "42"]), None).unwrap();
    assert_eq!(run.code, 42);
}

#[test]
fn test_wait_is_memoized() {
    let options = SpawnOptions::new().args(ArgList::new(["--exit-code", "5", "--sleep-ms", "50"]));
    let mut process = spawn(&testexe_command(), &options).unwrap();
    assert_eq!(process.status(), ProcessStatus::Running);

    assert_eq!(wait_for(&mut process), 5);
    assert_eq!(process.status(), ProcessStatus::Exited(5));
    assert_eq!(wait_for(&mut process), 5);
    assert!(process.to_string().ends_with(", terminated)"));
}

#[test]
fn test_stdin_and_stdout_through_pipes() {
    let (stdin_reader, mut stdin_writer) = osex_os::pipe().unwrap();
    let (mut stdout_reader, stdout_writer) = osex_os::pipe().unwrap();

    let mut process = {
        let options = SpawnOptions::new()
            .args(ArgList::new(["--echo-stdin"]))
            .stdin(&stdin_reader)
            .stdout(&stdout_writer);
        spawn(&testexe_command(), &options).unwrap()
    };
    drop(stdin_reader);
    drop(stdout_writer);

    stdin_writer.write_all(b"round trip\n").unwrap();
    drop(stdin_writer);

    let mut output = String::new();
    stdout_reader.read_to_string(&mut output).unwrap();
    assert_eq!(output, "round trip\n");
    assert_eq!(wait_for(&mut process), 0);
}

#[test]
fn test_stderr_redirect_to_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("err.txt");
    let file = std::fs::File::create(&path).unwrap();

    let options = SpawnOptions::new()
        .args(ArgList::new(["--stderr-text", "diagnostic"]))
        .stderr(&file);
    let mut process = spawn(&testexe_command(), &options).unwrap();
    assert_eq!(wait_for(&mut process), 0);
    drop(file);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "diagnostic");
}

#[test]
fn test_missing_command_fails_to_spawn() {
    let err = spawn("osex-e2e-missing-command", &SpawnOptions::new()).unwrap_err();
    assert!(err.to_string().contains("osex-e2e-missing-command"), "{}", err);
    assert!(err.native_code().is_some());
}
