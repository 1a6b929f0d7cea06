//! Process capability used by the supervisor
//!
//! The supervisor only needs a byte sink, a byte source and a way to ask
//! whether the child is still alive. Tests substitute an in-memory process.

use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tracing::debug;

/// Liveness of the supervised process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    /// Exit code, `None` when terminated by a signal
    Exited(Option<i32>),
}

/// Handle for checking on and terminating a launched process
pub trait ProcessMonitor: Send {
    fn try_wait(&mut self) -> io::Result<ProcessStatus>;

    /// Request termination without waiting for it
    fn kill(&mut self) -> io::Result<()>;
}

/// A running voice client with its standard streams
pub struct VoiceProcess {
    pub stdin: Box<dyn AsyncWrite + Send + Unpin>,
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    pub monitor: Box<dyn ProcessMonitor>,
}

impl std::fmt::Debug for VoiceProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceProcess").finish_non_exhaustive()
    }
}

/// Starts voice client processes
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, program: &Path, args: &[String]) -> io::Result<VoiceProcess>;
}

/// Launches real child processes through `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn launch(&self, program: &Path, args: &[String]) -> io::Result<VoiceProcess> {
        debug!("Spawning {} {}", program.display(), args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdin not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdout not piped"))?;

        Ok(VoiceProcess {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            monitor: Box::new(ChildMonitor { child }),
        })
    }
}

struct ChildMonitor {
    child: Child,
}

impl ProcessMonitor for ChildMonitor {
    fn try_wait(&mut self) -> io::Result<ProcessStatus> {
        Ok(match self.child.try_wait()? {
            Some(status) => ProcessStatus::Exited(status.code()),
            None => ProcessStatus::Running,
        })
    }

    fn kill(&mut self) -> io::Result<()> {
        match self.child.start_kill() {
            // Already reaped
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            other => other,
        }
    }
}
