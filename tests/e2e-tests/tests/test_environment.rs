//! Environment inheritance versus explicit environments.

use e2e_tests::run_testexe;
use osex_spawn::{ArgList, Environment};

fn print_env() -> ArgList {
    ArgList::new(["--print-env"])
}

#[test]
fn test_explicit_environment_is_exact() {
    let mut env = Environment::new();
    env.set("OSEX_ONE", "1").set("OSEX_TWO", "two words");
    #[cfg(windows)]
    env.set("SystemRoot", std::env::var("SystemRoot").unwrap_or_default());

    let run = run_testexe(print_env(), Some(env)).unwrap();

    assert_eq!(run.code, 0);
    let lines: Vec<&str> = run
        .lines()
        .into_iter()
        .filter(|line| !line.starts_with("SystemRoot="))
        .collect();
    assert_eq!(lines, ["OSEX_ONE=1", "OSEX_TWO=two words"]);
}

#[cfg(unix)]
#[test]
fn test_empty_environment_is_not_inheritance() {
    let run = run_testexe(print_env(), Some(Environment::new())).unwrap();
    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, "");
}

#[test]
fn test_omitted_environment_inherits_parent() {
    let run = run_testexe(print_env(), None).unwrap();
    let path_name = if cfg!(windows) { "Path=" } else { "PATH=" };
    assert!(
        run.lines()
            .iter()
            .any(|line| line.to_ascii_uppercase().starts_with(&path_name.to_ascii_uppercase())),
        "PATH missing from inherited environment:\n{}",
        run.stdout
    );
}

#[test]
fn test_values_with_equals_signs_survive() {
    let mut env = Environment::new();
    env.set("OSEX_EXPR", "a=b=c");
    #[cfg(windows)]
    env.set("SystemRoot", std::env::var("SystemRoot").unwrap_or_default());

    let run = run_testexe(print_env(), Some(env)).unwrap();
    assert!(run.lines().contains(&"OSEX_EXPR=a=b=c"));
}
