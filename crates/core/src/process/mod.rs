//! Runs external commands from explicit argument vectors and classifies the
//! result.

use std::ffi::OsString;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// How an external invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success { stdout: String },
    NonZeroExit { code: Option<i32>, stderr: String },
    /// The executable does not exist on the path.
    NotFound,
    TimedOut(Duration),
    SpawnFailed(String),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::Success { stdout } => Some(stdout),
            _ => None,
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { .. } => write!(f, "succeeded"),
            Self::NonZeroExit { code: Some(code), stderr } => {
                write!(f, "exited with status {code}: {}", stderr.trim())
            }
            Self::NonZeroExit { code: None, stderr } => {
                write!(f, "terminated by signal: {}", stderr.trim())
            }
            Self::NotFound => write!(f, "executable not found"),
            Self::TimedOut(limit) => write!(f, "timed out after {limit:?}"),
            Self::SpawnFailed(reason) => write!(f, "could not be started: {reason}"),
        }
    }
}

/// Runs `program` with `args`, capturing output. A child that outlives
/// `timeout` is killed.
pub async fn run_command(
    program: &Path,
    args: &[OsString],
    timeout: Option<Duration>,
) -> CommandOutcome {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(program = %program.display(), ?args, "running external command");

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
            Ok(result) => result,
            Err(_) => return CommandOutcome::TimedOut(limit),
        },
        None => cmd.output().await,
    };

    match output {
        Ok(output) if output.status.success() => CommandOutcome::Success {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        },
        Ok(output) => CommandOutcome::NonZeroExit {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Err(err) if err.kind() == ErrorKind::NotFound => CommandOutcome::NotFound,
        Err(err) => CommandOutcome::SpawnFailed(err.to_string()),
    }
}
