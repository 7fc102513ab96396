//! Command execution.
//!
//! The dispatcher talks to a [`CommandRunner`] so the process-spawning side
//! can be swapped out; [`ProcessRunner`] is the real one.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use super::Outcome;

/// How long to keep reading output after the process has exited. A
/// background grandchild can hold the pipes open indefinitely.
const PIPE_DRAIN: Duration = Duration::from_secs(1);

/// One command invocation.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub executable: &'a Path,
    /// The item's relative name, passed as the only argument.
    pub argument: &'a OsStr,
    pub working_dir: &'a Path,
    pub timeout: Option<Duration>,
}

/// Runs a command to completion and classifies the result.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation<'_>) -> Outcome;
}

/// Spawns the command as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation<'_>) -> Outcome {
        let mut command = Command::new(invocation.executable);
        command
            .arg(invocation.argument)
            .current_dir(invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a timeout reaches everything the command started
        #[cfg(unix)]
        {
            command.process_group(0);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return Outcome::SpawnFailure {
                    reason: e.to_string(),
                };
            }
        };

        let stdout = collect(child.stdout.take());
        let stderr = collect(child.stderr.take());

        let status = match invocation.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    terminate(&mut child, invocation.executable).await;
                    stdout.abort();
                    stderr.abort();
                    return Outcome::Timeout { after: limit };
                }
            },
            None => child.wait().await,
        };

        let stdout = finish(stdout).await;
        let stderr = finish(stderr).await;
        if !stdout.is_empty() {
            crate::debug_event!("runner", "stdout", "{}", stdout.trim_end());
        }

        match status {
            Ok(status) if status.success() => Outcome::Success,
            Ok(status) => Outcome::NonzeroExit {
                code: status.code(),
                stderr: stderr.trim_end().to_string(),
            },
            Err(e) => Outcome::Other {
                reason: e.to_string(),
            },
        }
    }
}

/// Kill the command and everything in its process group, then reap it.
async fn terminate(child: &mut Child, executable: &Path) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: plain syscall; the group id is the child's pid from process_group(0)
            let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
            if rc == 0 {
                if let Err(e) = child.wait().await {
                    tracing::warn!("[runner] failed to reap {}: {e}", executable.display());
                }
                return;
            }
        }
    }

    if let Err(e) = child.kill().await {
        tracing::warn!("[runner] failed to kill {}: {e}", executable.display());
    }
}

fn collect<R>(pipe: Option<R>) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

async fn finish(mut task: JoinHandle<String>) -> String {
    match tokio::time::timeout(PIPE_DRAIN, &mut task).await {
        Ok(Ok(text)) => text,
        Ok(Err(_)) => String::new(),
        Err(_) => {
            task.abort();
            String::new()
        }
    }
}
