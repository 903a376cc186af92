use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Failure talking to the Docker CLI or the Engine API socket.
#[derive(Debug)]
pub enum DockerError {
    /// Command did not finish within its bound.
    Timeout { command: String, timeout: Duration },

    /// Command ran and exited non-zero.
    CommandFailed {
        command: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    /// The `docker` binary could not be executed.
    ExecFailed {
        command: String,
        source: std::io::Error,
    },

    /// "No such container" from the CLI, or 404 from the Engine API.
    ContainerNotFound { container: String },

    /// The daemon refused or never answered.
    DaemonUnavailable { detail: String },

    /// Engine API socket could not be connected to.
    Socket {
        path: PathBuf,
        source: reqwest::Error,
    },

    /// Engine API answered with an unexpected status or body.
    Engine { status: u16, message: String },
}

impl DockerError {
    pub fn timeout(cmd: impl Into<String>, dur: Duration) -> Self {
        DockerError::Timeout {
            command: cmd.into(),
            timeout: dur,
        }
    }

    pub fn exec_failed(cmd: impl Into<String>, err: std::io::Error) -> Self {
        DockerError::ExecFailed {
            command: cmd.into(),
            source: err,
        }
    }

    /// Classify a non-zero exit by what the CLI printed.
    pub fn from_output(cmd: impl Into<String>, container: &str, output: &std::process::Output) -> Self {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Self::classify(cmd, container, stderr, output.status.code())
    }

    pub(crate) fn classify(
        cmd: impl Into<String>,
        container: &str,
        stderr: String,
        exit_code: Option<i32>,
    ) -> Self {
        if stderr.contains("No such container") || stderr.contains("No such object") {
            return DockerError::ContainerNotFound {
                container: container.to_string(),
            };
        }
        if is_daemon_unreachable(&stderr) {
            return DockerError::DaemonUnavailable { detail: stderr };
        }
        DockerError::CommandFailed {
            command: cmd.into(),
            stderr,
            exit_code,
        }
    }

    /// True when the engine itself could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DockerError::Timeout { .. }
                | DockerError::ExecFailed { .. }
                | DockerError::DaemonUnavailable { .. }
                | DockerError::Socket { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DockerError::ContainerNotFound { .. })
    }
}

fn is_daemon_unreachable(stderr: &str) -> bool {
    stderr.contains("Cannot connect to the Docker daemon")
        || stderr.contains("error during connect")
        || stderr.contains("Is the docker daemon running")
}

impl fmt::Display for DockerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockerError::Timeout { command, timeout } => write!(
                f,
                "Timed out running '{}' (exceeded {:?})",
                command, timeout
            ),
            DockerError::CommandFailed {
                command,
                stderr,
                exit_code,
            } => match exit_code {
                Some(code) => write!(f, "'{}' failed (exit code {}): {}", command, code, stderr),
                None => write!(f, "'{}' failed: {}", command, stderr),
            },
            DockerError::ExecFailed { command, source } => {
                write!(f, "Failed to execute '{}': {}", command, source)
            }
            DockerError::ContainerNotFound { container } => {
                write!(f, "No such container: {}", container)
            }
            DockerError::DaemonUnavailable { detail } => {
                write!(f, "Docker daemon is not reachable: {}", detail)
            }
            DockerError::Socket { path, source } => {
                write!(f, "Docker socket {} unavailable: {}", path.display(), source)
            }
            DockerError::Engine { status, message } => {
                write!(f, "Docker Engine API returned {}: {}", status, message)
            }
        }
    }
}

impl std::error::Error for DockerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DockerError::ExecFailed { source, .. } => Some(source),
            DockerError::Socket { source, .. } => Some(source),
            _ => None,
        }
    }
}
