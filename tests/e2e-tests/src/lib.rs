// E2E Test Framework for OSEX

use osex_spawn::{spawn, ArgList, Environment, Process, SpawnOptions};
use std::env;
use std::io::Read;
use std::path::PathBuf;

/// Get the path to the TESTEXE (testexe) binary
pub fn get_testexe_path() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current exe path")
        .parent()
        .expect("Failed to get parent dir")
        .to_path_buf();

    // If we're in deps/, go up one level
    if path.ends_with("deps") {
        path.pop();
    }

    #[cfg(windows)]
    path.push("testexe.exe");

    #[cfg(not(windows))]
    path.push("testexe");

    if !path.exists() {
        panic!("TESTEXE binary not found at: {}", path.display());
    }

    path
}

/// The testexe path as the command string handed to `spawn`.
pub fn testexe_command() -> String {
    get_testexe_path().to_string_lossy().into_owned()
}

/// Output of a finished child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRun {
    pub code: i32,
    pub stdout: String,
}

impl CapturedRun {
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}

/// Runs testexe with `args`, capturing its stdout through an OSEX pipe.
pub fn run_testexe(args: ArgList, env: Option<Environment>) -> osex_common::Result<CapturedRun> {
    run_captured(&testexe_command(), args, env)
}

/// Runs `command` with `args`, capturing its stdout through an OSEX pipe.
pub fn run_captured(
    command: &str,
    args: ArgList,
    env: Option<Environment>,
) -> osex_common::Result<CapturedRun> {
    let (mut reader, writer) = osex_os::pipe()?;

    let mut process = {
        let mut options = SpawnOptions::new().args(args).stdout(&writer);
        if let Some(env) = env {
            options = options.env(env);
        }
        spawn(command, &options)?
    };
    // The child holds its own copy; ours must go for EOF to arrive.
    drop(writer);

    let mut stdout = String::new();
    reader.read_to_string(&mut stdout)?;
    let code = process.wait()?;
    Ok(CapturedRun { code, stdout })
}

/// Waits for `process`, panicking with its description on failure.
pub fn wait_for(process: &mut Process) -> i32 {
    match process.wait() {
        Ok(code) => code,
        Err(e) => panic!("wait for {} failed: {}", process, e),
    }
}
