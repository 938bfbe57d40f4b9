//! Probe execution.
//!
//! A [`Probe`] describes the external action a sensor wants performed; a
//! [`Prober`] performs it asynchronously and returns a [`ProbeOutcome`].
//! Sensors never run probes themselves, so they stay synchronous state
//! machines and can be driven by hand in tests.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors raised while running a probe.
///
/// These never reach the indicator: sensors turn them into the broken
/// sentinel.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program was killed before it could exit.
    #[error("{program} was terminated by a signal")]
    Signal { program: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Timeout waiting for response.
    #[error("request timed out")]
    Timeout,

    /// Failed to parse a response body.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Http(err.to_string())
        }
    }
}

/// The `program` field of a sensor: a shell command line or an argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Program {
    Shell(String),
    Argv(Vec<String>),
}

impl Program {
    /// Build the command to spawn. Blank programs yield `None`.
    pub fn to_command(&self) -> Option<ProbeCommand> {
        match self {
            Program::Shell(line) if line.trim().is_empty() => None,
            Program::Shell(line) => Some(ProbeCommand {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), line.clone()],
            }),
            Program::Argv(argv) => {
                let (program, args) = argv.split_first()?;
                Some(ProbeCommand {
                    program: program.clone(),
                    args: args.to_vec(),
                })
            }
        }
    }
}

/// A resolved program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ProbeCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for ProbeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// An external action requested by a sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Run the command and report its exit code.
    ExitCode(ProbeCommand),
    /// Run the command and capture its standard output.
    Output(ProbeCommand),
    /// Fetch a URL and return the response body.
    Fetch(String),
}

/// What came back from a [`Probe`].
#[derive(Debug)]
pub enum ProbeOutcome {
    /// Exit code, or `-1` if the program could not be started or was killed.
    ExitCode(i64),
    /// Exit status and standard output of a program that ran to completion.
    Output(Result<Captured, ProbeError>),
    /// Response body of a successful fetch.
    Fetched(Result<Vec<u8>, ProbeError>),
}

/// Output of a program that exited on its own, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub code: i32,
    pub stdout: String,
}

impl Captured {
    pub fn new(code: i32, stdout: impl Into<String>) -> Self {
        Self {
            code,
            stdout: stdout.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Capability to perform probes without blocking the event loop.
///
/// # Example
///
/// ```
/// use tinydash::sensor::{Probe, ProbeCommand, ProbeOutcome, Prober, SystemProber};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let prober = SystemProber::new(Duration::from_secs(5)).unwrap();
/// let outcome = prober.run(Probe::ExitCode(ProbeCommand::new("true", &[]))).await;
/// assert!(matches!(outcome, ProbeOutcome::ExitCode(0)));
/// # });
/// ```
#[async_trait]
pub trait Prober: Send + Sync + fmt::Debug {
    async fn run(&self, probe: Probe) -> ProbeOutcome;
}

/// Runs local processes with tokio and fetches URLs with reqwest.
#[derive(Debug, Clone)]
pub struct SystemProber {
    client: reqwest::Client,
}

impl SystemProber {
    pub fn new(http_timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder().timeout(http_timeout).build()?;
        Ok(Self { client })
    }

    async fn exit_code(&self, cmd: &ProbeCommand) -> i64 {
        match cmd.command().stdout(Stdio::null()).stderr(Stdio::null()).status().await {
            Ok(status) => match status.code() {
                Some(code) => code.into(),
                None => {
                    debug!("{} was terminated by a signal", cmd);
                    -1
                }
            },
            Err(e) => {
                debug!("Failed to start {}: {}", cmd, e);
                -1
            }
        }
    }

    async fn output(&self, cmd: &ProbeCommand) -> Result<Captured, ProbeError> {
        let output = cmd.command().output().await.map_err(|source| ProbeError::Spawn {
            program: cmd.program.clone(),
            source,
        })?;

        if !output.stderr.is_empty() {
            debug!(
                "{} wrote to stderr: {}",
                cmd,
                String::from_utf8_lossy(&output.stderr).trim_end()
            );
        }

        match output.status.code() {
            Some(code) => Ok(Captured::new(
                code,
                String::from_utf8_lossy(&output.stdout),
            )),
            None => Err(ProbeError::Signal {
                program: cmd.program.clone(),
            }),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProbeError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ProbeError::Http(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Prober for SystemProber {
    async fn run(&self, probe: Probe) -> ProbeOutcome {
        match probe {
            Probe::ExitCode(cmd) => ProbeOutcome::ExitCode(self.exit_code(&cmd).await),
            Probe::Output(cmd) => ProbeOutcome::Output(self.output(&cmd).await),
            Probe::Fetch(url) => ProbeOutcome::Fetched(self.fetch(&url).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prober() -> SystemProber {
        SystemProber::new(Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_program_to_command() {
        let shell = Program::Shell("ping -c1 host".to_string());
        assert_eq!(
            shell.to_command().unwrap(),
            ProbeCommand::new("sh", &["-c", "ping -c1 host"])
        );

        let argv = Program::Argv(vec!["ping".into(), "-c1".into(), "host".into()]);
        assert_eq!(
            argv.to_command().unwrap(),
            ProbeCommand::new("ping", &["-c1", "host"])
        );

        assert!(Program::Argv(vec![]).to_command().is_none());
        assert!(Program::Shell("  ".to_string()).to_command().is_none());
    }

    #[test]
    fn test_command_display() {
        assert_eq!(ProbeCommand::new("ls", &["-l", "/tmp"]).to_string(), "ls -l /tmp");
    }

    #[tokio::test]
    async fn test_exit_code_probe() {
        let p = prober();
        let ok = p.run(Probe::ExitCode(ProbeCommand::new("true", &[]))).await;
        assert!(matches!(ok, ProbeOutcome::ExitCode(0)));

        let failed = p
            .run(Probe::ExitCode(ProbeCommand::new("sh", &["-c", "exit 3"])))
            .await;
        assert!(matches!(failed, ProbeOutcome::ExitCode(3)));
    }

    #[tokio::test]
    async fn test_exit_code_probe_missing_program() {
        let outcome = prober()
            .run(Probe::ExitCode(ProbeCommand::new("/nonexistent/tinydash-probe", &[])))
            .await;
        assert!(matches!(outcome, ProbeOutcome::ExitCode(-1)));
    }

    #[tokio::test]
    async fn test_output_probe_captures_stdout() {
        let outcome = prober()
            .run(Probe::Output(ProbeCommand::new("sh", &["-c", "printf 'OK\\nextra\\n'"])))
            .await;
        match outcome {
            ProbeOutcome::Output(Ok(captured)) => {
                assert_eq!(captured, Captured::new(0, "OK\nextra\n"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_output_probe_keeps_stdout_on_failure() {
        let outcome = prober()
            .run(Probe::Output(ProbeCommand::new("sh", &["-c", "echo inactive; exit 3"])))
            .await;
        match outcome {
            ProbeOutcome::Output(Ok(captured)) => {
                assert_eq!(captured, Captured::new(3, "inactive\n"));
                assert!(!captured.success());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_output_probe_missing_program() {
        let outcome = prober()
            .run(Probe::Output(ProbeCommand::new("/nonexistent/tinydash-probe", &[])))
            .await;
        assert!(matches!(outcome, ProbeOutcome::Output(Err(ProbeError::Spawn { .. }))));
    }


    #[tokio::test]
    async fn test_fetch_unreachable() {
        let outcome = prober()
            .run(Probe::Fetch("http://127.0.0.1:1/lastBuild/api/json".to_string()))
            .await;
        assert!(matches!(outcome, ProbeOutcome::Fetched(Err(_))));
    }
}
