use clap::Parser;
use osex_common::LockMode;
use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Test executable for OSEX E2E testing
#[derive(Parser, Debug)]
#[command(name = "testexe")]
#[command(about = "Child process used by the OSEX spawn tests", long_about = None)]
struct Args {
    /// Print every argv entry, including argv[0], as "<index>:<value>"
    #[arg(long)]
    print_args: bool,

    /// Print the environment as sorted NAME=VALUE lines
    #[arg(long)]
    print_env: bool,

    /// Copy standard input to standard output
    #[arg(long)]
    echo_stdin: bool,

    /// Write this text to standard error
    #[arg(long)]
    stderr_text: Option<String>,

    /// Try to take a write lock on FILE and print "locked" or "busy"
    #[arg(long, value_name = "FILE")]
    try_lock: Option<PathBuf>,

    /// Milliseconds to sleep before exiting
    #[arg(long, default_value = "0")]
    sleep_ms: u64,

    /// Exit code to return
    #[arg(long, default_value = "0")]
    exit_code: i32,

    /// Extra arguments, only used by --print-args
    #[arg(last = true)]
    rest: Vec<String>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let mut stdout = io::stdout().lock();

    if args.print_args {
        for (index, arg) in std::env::args_os().enumerate() {
            writeln!(stdout, "{}:{}", index, arg.to_string_lossy())?;
        }
    }

    if args.print_env {
        let mut vars: Vec<(String, String)> = std::env::vars().collect();
        vars.sort();
        for (name, value) in vars {
            writeln!(stdout, "{}={}", name, value)?;
        }
    }

    if args.echo_stdin {
        let mut input = Vec::new();
        io::stdin().read_to_end(&mut input)?;
        stdout.write_all(&input)?;
    }

    if let Some(text) = &args.stderr_text {
        write!(io::stderr(), "{}", text)?;
    }

    if let Some(path) = &args.try_lock {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        match osex_os::lock(&file, LockMode::Write, 0, 0) {
            Ok(()) => writeln!(stdout, "locked")?,
            Err(_) => writeln!(stdout, "busy")?,
        }
    }

    stdout.flush()?;
    drop(stdout);

    if args.sleep_ms > 0 {
        std::thread::sleep(Duration::from_millis(args.sleep_ms));
    }

    std::process::exit(args.exit_code);
}
