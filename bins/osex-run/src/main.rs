use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use tracing::{error, info};

use osex_spawn::{ArgList, Environment, SpawnOptions};

mod config;

use config::JobConfig;

/// Exit status when the command could not be started.
const SPAWN_FAILED: i32 = 127;
/// Exit status for invalid jobs and arguments.
const USAGE_ERROR: i32 = 2;

/// OSEX runner - start a command with explicit arguments, environment and
/// standard streams, then exit with its status
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Job file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Set a variable in the child's environment
    #[arg(short, long = "env", value_name = "NAME=VALUE", value_parser = parse_env_pair)]
    env: Vec<(String, String)>,

    /// Do not inherit the runner's environment (a job-file env is kept)
    #[arg(long)]
    clear_env: bool,

    /// Redirect the child's standard input from FILE
    #[arg(long, value_name = "FILE")]
    stdin: Option<PathBuf>,

    /// Redirect the child's standard output to FILE
    #[arg(long, value_name = "FILE")]
    stdout: Option<PathBuf>,

    /// Redirect the child's standard error to FILE
    #[arg(long, value_name = "FILE")]
    stderr: Option<PathBuf>,

    /// Name the child sees as its own argv[0] (POSIX only)
    #[arg(long, value_name = "NAME")]
    arg0: Option<String>,

    /// Command and arguments
    #[arg(last = true, value_name = "COMMAND")]
    command: Vec<String>,
}

fn parse_env_pair(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.debug);

    let job = match build_job(&args) {
        Ok(job) => job,
        Err(e) => {
            error!("Invalid job: {:#}", e);
            eprintln!("osex-run: {:#}", e);
            std::process::exit(USAGE_ERROR);
        }
    };

    let code = match run(&job) {
        Ok(code) => code,
        Err(e) => {
            error!("Failed to run {}: {:#}", job.command, e);
            eprintln!("osex-run: {:#}", e);
            SPAWN_FAILED
        }
    };
    std::process::exit(code);
}

fn initialize_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Merges the job file (if any) with command-line overrides.
fn build_job(args: &Args) -> Result<JobConfig> {
    let mut job = match &args.config {
        Some(path) => {
            info!("Job file: {}", path.display());
            JobConfig::load_from_file(path)?
        }
        None => JobConfig::default(),
    };

    if let Some((command, rest)) = args.command.split_first() {
        job.command = command.clone();
        job.args = rest.to_vec();
    }
    if args.arg0.is_some() {
        job.arg0 = args.arg0.clone();
    }
    for (slot, value) in [
        (&mut job.stdin, &args.stdin),
        (&mut job.stdout, &args.stdout),
        (&mut job.stderr, &args.stderr),
    ] {
        if value.is_some() {
            *slot = value.clone();
        }
    }

    // A job-file env is already exact; --clear-env only replaces inheritance.
    if args.clear_env || !args.env.is_empty() {
        let mut env = match job.env.take() {
            Some(env) => env,
            None if args.clear_env => Default::default(),
            None => Environment::current()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        env.extend(args.env.iter().cloned());
        job.env = Some(env);
    }

    job.validate()?;
    Ok(job)
}

/// Spawns the job and waits for it. Errors mean the child never started.
fn run(job: &JobConfig) -> Result<i32> {
    let stdin = job
        .stdin
        .as_ref()
        .map(|path| File::open(path).with_context(|| format!("Failed to open stdin file: {}", path.display())))
        .transpose()?;
    let stdout = job
        .stdout
        .as_ref()
        .map(|path| File::create(path).with_context(|| format!("Failed to create stdout file: {}", path.display())))
        .transpose()?;
    let stderr = job
        .stderr
        .as_ref()
        .map(|path| File::create(path).with_context(|| format!("Failed to create stderr file: {}", path.display())))
        .transpose()?;

    let mut list = ArgList::new(job.args.iter().cloned());
    if let Some(arg0) = &job.arg0 {
        list = list.with_arg0(arg0.clone());
    }
    let mut options = SpawnOptions::new().args(list);
    if let Some(env) = &job.env {
        options = options.env(env.iter().collect());
    }
    if let Some(file) = &stdin {
        options = options.stdin(file);
    }
    if let Some(file) = &stdout {
        options = options.stdout(file);
    }
    if let Some(file) = &stderr {
        options = options.stderr(file);
    }

    let mut process = osex_spawn::spawn(&job.command, &options)?;
    info!("Started {}", process);

    let code = process
        .wait()
        .map_err(|e| anyhow!("Failed to wait for {}: {}", job.command, e))?;
    info!("Process exited with code {}", code);
    Ok(code)
}
