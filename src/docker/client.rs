//! Docker CLI client.
//!
//! Every `docker` subprocess goes through `DockerClient`, which bounds it with
//! a timeout and maps failures to [`DockerError`].

use super::DockerError;
use std::process::Output;
use std::time::Duration;
use tracing::debug;

/// Identity and state of an existing container, as reported by `docker inspect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    pub id: String,
    /// Raw engine state: `created`, `running`, `restarting`, `exited`, ...
    pub status: String,
}

/// Arguments for `docker run -d`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub name: String,
    pub image: String,
    pub network: Option<String>,
    pub labels: Vec<(String, String)>,
    /// `host:container`
    pub publish: Vec<String>,
    pub env: Vec<(String, String)>,
    /// `source:target:mode`
    pub mounts: Vec<String>,
}

impl RunOptions {
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];
        if let Some(network) = &self.network {
            args.push("--network".to_string());
            args.push(network.clone());
        }
        for (key, value) in &self.labels {
            args.push("--label".to_string());
            args.push(format!("{}={}", key, value));
        }
        for port in &self.publish {
            args.push("-p".to_string());
            args.push(port.clone());
        }
        for (key, value) in &self.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        for mount in &self.mounts {
            args.push("-v".to_string());
            args.push(mount.clone());
        }
        args.push(self.image.clone());
        args
    }
}

#[derive(Debug, Clone)]
pub struct DockerClient {
    binary: String,
}

impl DockerClient {
    pub fn new() -> Self {
        Self::with_binary("docker")
    }

    /// Use a different CLI binary (e.g. a podman shim).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run a command with a timeout, returning raw Output.
    async fn run(&self, args: &[&str], timeout: Duration) -> Result<Output, DockerError> {
        let cmd_str = format!("{} {}", self.binary, args.join(" "));
        debug!("Running {}", cmd_str);

        let result = tokio::time::timeout(
            timeout,
            tokio::process::Command::new(&self.binary)
                .args(args)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(DockerError::exec_failed(cmd_str, e)),
            Err(_) => Err(DockerError::timeout(cmd_str, timeout)),
        }
    }

    /// Run a command, classifying a non-zero exit against `container`.
    async fn run_for(
        &self,
        container: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output, DockerError> {
        let output = self.run(args, timeout).await?;
        if output.status.success() {
            Ok(output)
        } else {
            let cmd_str = format!("{} {}", self.binary, args.first().copied().unwrap_or_default());
            Err(DockerError::from_output(cmd_str, container, &output))
        }
    }

    /// Create and start a detached container. Returns the new container id.
    pub async fn run_detached(
        &self,
        options: &RunOptions,
        timeout: Duration,
    ) -> Result<String, DockerError> {
        let args = options.to_args();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.run_for(&options.name, &arg_refs, timeout).await?;

        // Pull progress may precede the id; the id is the last line.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let id = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .unwrap_or_default()
            .to_string();

        if id.is_empty() {
            return Err(DockerError::CommandFailed {
                command: format!("{} run", self.binary),
                stderr: "no container id in output".to_string(),
                exit_code: output.status.code(),
            });
        }
        Ok(id)
    }

    /// Remove a stopped container. Running containers are left alone and
    /// reported as a failure; a missing container is not an error.
    pub async fn rm(&self, container: &str, timeout: Duration) -> Result<(), DockerError> {
        match self.run_for(container, &["rm", container], timeout).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Stop a container gracefully.
    pub async fn stop(&self, container: &str, timeout: Duration) -> Result<(), DockerError> {
        self.run_for(container, &["stop", container], timeout)
            .await
            .map(|_| ())
    }

    /// Container id and raw state.
    pub async fn inspect(
        &self,
        container: &str,
        timeout: Duration,
    ) -> Result<ContainerState, DockerError> {
        let output = self
            .run_for(
                container,
                &[
                    "inspect",
                    "--type",
                    "container",
                    "--format",
                    "{{.Id}} {{.State.Status}}",
                    container,
                ],
                timeout,
            )
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut parts = stdout.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(id), Some(status)) => Ok(ContainerState {
                id: id.to_string(),
                status: status.to_string(),
            }),
            _ => Err(DockerError::CommandFailed {
                command: format!("{} inspect", self.binary),
                stderr: format!("unexpected output: {}", stdout.trim()),
                exit_code: output.status.code(),
            }),
        }
    }

    /// Last `tail` lines of combined stdout and stderr.
    pub async fn logs(
        &self,
        container: &str,
        tail: usize,
        timeout: Duration,
    ) -> Result<String, DockerError> {
        let tail_str = tail.to_string();
        let output = self
            .run_for(container, &["logs", "--tail", &tail_str, container], timeout)
            .await?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    pub async fn daemon_healthy(&self, timeout: Duration) -> bool {
        match self
            .run(&["info", "--format", "{{.ServerVersion}}"], timeout)
            .await
        {
            Ok(o) => o.status.success(),
            Err(_) => false,
        }
    }
}

impl Default for DockerClient {
    fn default() -> Self {
        Self::new()
    }
}
