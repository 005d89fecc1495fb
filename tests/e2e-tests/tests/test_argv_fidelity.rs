//! Arguments reach the child exactly as passed.

use e2e_tests::{run_testexe, testexe_command};
use osex_spawn::ArgList;

#[test]
fn test_plain_and_spaced_arguments() {
    let args = ArgList::new(["--print-args", "--", "plain", "two words"]);
    let run = run_testexe(args, None).unwrap();

    assert_eq!(run.code, 0);
    let lines = run.lines();
    assert_eq!(&lines[1..], ["1:--print-args", "2:--", "3:plain", "4:two words"]);
}

#[test]
fn test_no_arguments_runs_command_alone() {
    let run = e2e_tests::run_captured(&testexe_command(), ArgList::default(), None).unwrap();
    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, "");
}

#[cfg(unix)]
#[test]
fn test_shell_metacharacters_are_not_interpreted() {
    let args = ArgList::new([
        "--print-args",
        "--",
        "",
        "say \"hi\"",
        "$HOME",
        "back\\slash",
        "*",
    ]);
    let run = run_testexe(args, None).unwrap();

    let lines = run.lines();
    assert_eq!(
        &lines[3..],
        ["3:", "4:say \"hi\"", "5:$HOME", "6:back\\slash", "7:*"]
    );
}

#[cfg(unix)]
#[test]
fn test_arg0_override() {
    let args = ArgList::new(["--print-args"]).with_arg0("custom-name");
    let run = run_testexe(args, None).unwrap();
    assert_eq!(run.lines()[0], "0:custom-name");
}

#[cfg(unix)]
#[test]
fn test_empty_arg0_falls_back_to_command() {
    let command = testexe_command();
    let args = ArgList::new(["--print-args"]).with_arg0("");
    let run = run_testexe(args, None).unwrap();
    assert_eq!(run.lines()[0], format!("0:{}", command));
}
