//! YAML job files.
//!
//! ```yaml
//! command: sh
//! args: ["-c", "echo $GREETING"]
//! env:
//!   GREETING: hello
//! stdout: out.txt
//! ```
//!
//! Omitting `env` inherits the runner's environment; `env: {}` gives the
//! child an empty one.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One command to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<PathBuf>,
}

impl JobConfig {
    /// Load a job from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read job file: {}", path.as_ref().display()))?;
        Self::load_from_string(&content)
    }

    /// Load a job from a YAML string
    pub fn load_from_string(content: &str) -> Result<Self> {
        let job: JobConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML job file")?;
        Ok(job)
    }

    /// Validate the job before anything is opened or spawned
    pub fn validate(&self) -> Result<()> {
        if self.command.is_empty() {
            return Err(anyhow!("No command specified"));
        }
        if self.command.contains('\0') {
            return Err(anyhow!("Command contains an embedded NUL"));
        }
        for arg in &self.args {
            if arg.contains('\0') {
                return Err(anyhow!("Argument contains an embedded NUL: {:?}", arg));
            }
        }
        if let Some(env) = &self.env {
            for (name, value) in env {
                if name.is_empty() || name.contains('=') || name.contains('\0') {
                    return Err(anyhow!("Invalid environment variable name: {:?}", name));
                }
                if value.contains('\0') {
                    return Err(anyhow!("Environment variable {} contains an embedded NUL", name));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_job() {
        let job = JobConfig::load_from_string("command: echo\n").unwrap();
        assert_eq!(job.command, "echo");
        assert!(job.args.is_empty());
        assert!(job.env.is_none());
        job.validate().unwrap();
    }

    #[test]
    fn test_full_job() {
        let yaml = r#"
command: sh
args: ["-c", "exit 0"]
arg0: renamed
env:
  A: "1"
stdin: in.txt
stdout: out.txt
stderr: err.txt
"#;
        let job = JobConfig::load_from_string(yaml).unwrap();
        assert_eq!(job.args, vec!["-c", "exit 0"]);
        assert_eq!(job.arg0.as_deref(), Some("renamed"));
        assert_eq!(job.env.as_ref().unwrap().get("A").map(String::as_str), Some("1"));
        assert_eq!(job.stdout, Some(PathBuf::from("out.txt")));
        job.validate().unwrap();
    }

    #[test]
    fn test_empty_env_is_kept_distinct() {
        let job = JobConfig::load_from_string("command: env\nenv: {}\n").unwrap();
        assert_eq!(job.env, Some(BTreeMap::new()));
    }

    #[test]
    fn test_validation_failures() {
        assert!(JobConfig::default().validate().is_err());

        let mut job = JobConfig {
            command: "env".into(),
            ..Default::default()
        };
        job.env = Some(BTreeMap::from([("A=B".to_string(), "x".to_string())]));
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(JobConfig::load_from_string("command: echo\ncwd: /tmp\n").is_err());
    }
}
