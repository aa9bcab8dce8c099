use super::error::EngineError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What came back from one external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl JobOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// The job-execution collaborator.
///
/// Runs one shell command line to completion and reports how it went. A non-zero exit is a
/// normal [`JobOutcome`]; only failing to start the process at all is an error.
pub trait JobRunner {
    fn run(&self, command_line: &str, working_dir: &Path) -> Result<JobOutcome, EngineError>;
}

/// Runs command lines through `<shell> -c`, capturing stdout and stderr.
#[derive(Debug, Clone)]
pub struct ShellJobRunner {
    shell: PathBuf,
}

impl ShellJobRunner {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl JobRunner for ShellJobRunner {
    fn run(&self, command_line: &str, working_dir: &Path) -> Result<JobOutcome, EngineError> {
        info!("Running external job in {:?}", working_dir);
        debug!("Command line: {}", command_line);

        let start = Instant::now();
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| EngineError::Spawn {
                shell: self.shell.display().to_string(),
                source,
            })?;

        let outcome = JobOutcome {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: start.elapsed(),
        };

        if outcome.success() {
            info!(
                "External job finished in {:.2}s",
                outcome.duration.as_secs_f64()
            );
        } else {
            warn!(
                "External job failed (exit code {:?}) after {:.2}s",
                outcome.exit_code,
                outcome.duration.as_secs_f64()
            );
        }
        if !outcome.stdout.is_empty() {
            debug!("stdout:\n{}", outcome.stdout.trim_end());
        }
        if !outcome.stderr.is_empty() {
            debug!("stderr:\n{}", outcome.stderr.trim_end());
        }

        Ok(outcome)
    }
}
