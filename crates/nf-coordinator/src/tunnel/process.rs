//! A single reverse tunnel process

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;

use nf_core::config::TunnelConfig;
use nf_core::error::{ConnectFailure, TunnelConnectError};
use nf_core::{Host, TunnelState};

use super::status::StatusBoard;

/// How long to wait for stderr to flush after a failed login
const STDERR_FLUSH: Duration = Duration::from_millis(500);

/// A live tunnel process that has printed its login marker
pub struct Tunnel {
    host: String,
    child: Child,
    stdin: Option<ChildStdin>,
    board: StatusBoard,
    tasks: Vec<JoinHandle<()>>,
}

impl Tunnel {
    /// Spawn the tunnel for `host` and wait for it to log in.
    ///
    /// The host must already be registered on `board`. On any failure the
    /// process is killed, the host is marked `Failed`, and the error names
    /// the host.
    pub async fn connect(
        host: &Host,
        port: u16,
        config: &TunnelConfig,
        board: StatusBoard,
    ) -> Result<Self, TunnelConnectError> {
        let name = host.name.clone();
        let args = config.command_args(&host.address, port);
        tracing::debug!("Spawning {} {}", config.ssh_program, args.join(" "));

        let spawned = Command::new(&config.ssh_program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(source) => {
                board.transition(&name, TunnelState::Failed);
                return Err(TunnelConnectError::new(
                    name,
                    ConnectFailure::Spawn {
                        program: config.ssh_program.clone(),
                        source,
                    },
                ));
            }
        };
        board.transition(&name, TunnelState::Connecting);

        let stdin = child.stdin.take();
        let mut stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(drain_stderr(stderr, name.clone(), board.clone())));

        let Some(stdout) = child.stdout.take() else {
            let reason = ConnectFailure::Read(std::io::Error::new(
                std::io::ErrorKind::Other,
                "tunnel stdout was not captured",
            ));
            return Err(fail(&mut child, stderr_task.take(), &name, &board, reason).await);
        };
        let mut lines = BufReader::new(stdout).lines();

        tracing::info!("Waiting for login on {}...", name);
        let login = tokio::time::timeout(
            config.login_timeout,
            wait_for_marker(&mut lines, &config.login_marker, &name, &board),
        )
        .await;

        let reason = match login {
            Ok(Ok(())) => None,
            Ok(Err(reason)) => Some(reason),
            Err(_) => Some(ConnectFailure::Timeout {
                marker: config.login_marker.clone(),
                timeout: config.login_timeout,
            }),
        };
        if let Some(reason) = reason {
            return Err(fail(&mut child, stderr_task.take(), &name, &board, reason).await);
        }

        board.transition(&name, TunnelState::Established);

        let mut tasks: Vec<JoinHandle<()>> = stderr_task.into_iter().collect();
        tasks.push(tokio::spawn(monitor_output(lines, name.clone(), board.clone())));

        Ok(Self {
            host: name,
            child,
            stdin,
            board,
            tasks,
        })
    }

    /// Logical name of the host this tunnel serves
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Current lifecycle state
    pub fn state(&self) -> Option<TunnelState> {
        self.board.state(&self.host)
    }

    /// Ask the remote session to exit, then force it after `grace`.
    ///
    /// Always leaves the tunnel `Closed`.
    pub async fn close(mut self, grace: Duration) {
        self.board.transition(&self.host, TunnelState::Closing);

        if let Some(mut stdin) = self.stdin.take() {
            if let Err(e) = stdin.write_all(b"exit\n").await {
                tracing::debug!("Could not send exit to {}: {}", self.host, e);
            }
            // Dropping stdin closes the pipe
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!("Tunnel to {} exited with {}", self.host, status);
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to wait on tunnel to {}: {}", self.host, e);
                self.force_kill().await;
            }
            Err(_) => {
                tracing::warn!(
                    "Tunnel to {} failed to exit within {:?}, killing it",
                    self.host,
                    grace
                );
                self.force_kill().await;
            }
        }

        for task in self.tasks.drain(..) {
            task.abort();
        }

        self.board.transition(&self.host, TunnelState::Closed);
        tracing::info!("Closed tunnel to {}", self.host);
    }

    async fn force_kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!("Failed to kill tunnel to {}: {}", self.host, e);
        }
    }
}

/// Read lines until one contains `marker`
async fn wait_for_marker(
    lines: &mut Lines<BufReader<ChildStdout>>,
    marker: &str,
    host: &str,
    board: &StatusBoard,
) -> Result<(), ConnectFailure> {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim_end_matches('\r');
                tracing::debug!("[{}] {}", host, line);
                board.record_line(host, line);
                if line.contains(marker) {
                    return Ok(());
                }
            }
            Ok(None) => {
                return Err(ConnectFailure::ExitedEarly {
                    last_line: board.last_line(host),
                });
            }
            Err(e) => return Err(ConnectFailure::Read(e)),
        }
    }
}

/// Kill a tunnel that never logged in and build the error for it
async fn fail(
    child: &mut Child,
    stderr_task: Option<JoinHandle<()>>,
    host: &str,
    board: &StatusBoard,
    reason: ConnectFailure,
) -> TunnelConnectError {
    if let Err(e) = child.start_kill() {
        tracing::debug!("Tunnel to {} already gone: {}", host, e);
    }
    if let Err(e) = child.wait().await {
        tracing::debug!("Failed to reap tunnel to {}: {}", host, e);
    }

    // Let stderr catch up so the error carries the process's last words
    if let Some(mut task) = stderr_task {
        if tokio::time::timeout(STDERR_FLUSH, &mut task).await.is_err() {
            task.abort();
        }
    }

    let reason = match reason {
        ConnectFailure::ExitedEarly { .. } => ConnectFailure::ExitedEarly {
            last_line: board.last_line(host),
        },
        other => other,
    };

    board.transition(host, TunnelState::Failed);
    tracing::error!("Tunnel to {} failed: {}", host, reason);
    TunnelConnectError::new(host, reason)
}

/// Keep draining stdout after login and flag an unexpected drop
async fn monitor_output(mut lines: Lines<BufReader<ChildStdout>>, host: String, board: StatusBoard) {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim_end_matches('\r');
                tracing::debug!("[{}] {}", host, line);
                board.record_line(&host, line);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("Stopped reading tunnel output for {}: {}", host, e);
                break;
            }
        }
    }

    if board.transition_if(&host, TunnelState::Established, TunnelState::Failed) {
        tracing::warn!("Tunnel to {} dropped unexpectedly", host);
    }
}

async fn drain_stderr<R>(stderr: R, host: String, board: StatusBoard)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        tracing::debug!("[{} stderr] {}", host, line);
        board.record_line(&host, line);
    }
}
