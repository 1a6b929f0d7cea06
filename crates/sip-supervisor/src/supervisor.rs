//! Supervision of the pjsua child process
//!
//! Two tasks share the process. The reader turns stdout into prompt framed
//! responses. The supervising task is the only writer of stdin: each cycle it
//! checks the process is alive, runs at most one queued command, then polls
//! `call list` and publishes state changes to the [`CallEventHandler`].

use crate::config::SupervisorConfig;
use crate::error::{SupervisorError, SupervisorResult};
use crate::events::CallEventHandler;
use crate::process::{ProcessLauncher, ProcessMonitor, ProcessStatus, VoiceProcess};
use crate::protocol::{self, infer_call_state, PromptFramer, SupervisorCallState};
use crate::provision::ensure_binary;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

struct PendingCommand {
    line: String,
    timeout: Duration,
    reply: oneshot::Sender<SupervisorResult<String>>,
}

/// Handle to a running voice client
pub struct SipSupervisor {
    commands: mpsc::UnboundedSender<PendingCommand>,
    state: watch::Receiver<SupervisorCallState>,
    cancel: CancellationToken,
    command_timeout: Duration,
    supervisor_task: Mutex<Option<JoinHandle<SupervisorResult<()>>>>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SipSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SipSupervisor")
            .field("state", &*self.state.borrow())
            .field("running", &!self.cancel.is_cancelled())
            .finish()
    }
}

impl SipSupervisor {
    /// Provision and launch pjsua, then start supervising it
    ///
    /// Returns once the startup banner has been consumed. Any failure here is
    /// fatal for the daemon.
    pub async fn start(
        config: SupervisorConfig,
        launcher: &dyn ProcessLauncher,
        handler: Arc<dyn CallEventHandler>,
    ) -> SupervisorResult<Self> {
        let config = config.with_absolute_binary_path()?;
        ensure_binary(&config.binary_path, &config.download_url).await?;

        let (program, args) = config.command_line();
        info!("Starting voice client {}", config.binary_path.display());
        let VoiceProcess {
            stdin,
            stdout,
            mut monitor,
        } = launcher.launch(&program, &args)?;

        let cancel = CancellationToken::new();
        let (frame_tx, mut frames) = mpsc::unbounded_channel();
        let reader_task = tokio::spawn(read_frames(stdout, frame_tx, cancel.child_token()));

        match tokio::time::timeout(config.startup_timeout(), frames.recv()).await {
            Ok(Some(banner)) => debug!("Voice client banner: {}", banner),
            Ok(None) => {
                let code = exit_code(&mut *monitor);
                error!("Voice client exited during startup");
                return Err(SupervisorError::ProcessDied { code });
            }
            Err(_) => {
                let _ = monitor.kill();
                cancel.cancel();
                return Err(SupervisorError::Timeout {
                    command: "<startup>".to_string(),
                    timeout: config.startup_timeout(),
                });
            }
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SupervisorCallState::Idle);

        let cycle = SupervisingCycle {
            stdin,
            monitor,
            frames,
            commands: command_rx,
            handler,
            state: state_tx,
            stale_frames: 0,
            poll_interval: config.poll_interval(),
            poll_timeout: config.command_timeout(),
            cancel: cancel.clone(),
        };
        let supervisor_task = tokio::spawn(cycle.run());

        info!("Voice client ready");
        Ok(Self {
            commands: command_tx,
            state: state_rx,
            cancel,
            command_timeout: config.command_timeout(),
            supervisor_task: Mutex::new(Some(supervisor_task)),
            reader_task: Mutex::new(Some(reader_task)),
        })
    }

    /// Dial `address` (without the `sip:` scheme)
    pub async fn call(&self, address: &str) -> SupervisorResult<String> {
        info!("Calling {}", address);
        self.send_command(&protocol::call_new(address), self.command_timeout)
            .await
    }

    /// Answer the ringing inbound call
    pub async fn accept_call(&self) -> SupervisorResult<String> {
        self.send_command(protocol::ANSWER_CALL, self.command_timeout)
            .await
    }

    /// Hang up every call
    pub async fn hangup_all(&self) -> SupervisorResult<String> {
        self.send_command(protocol::HANGUP_ALL, self.command_timeout)
            .await
    }

    /// Raw `call list` output
    pub async fn call_list(&self) -> SupervisorResult<String> {
        self.send_command(protocol::CALL_LIST, self.command_timeout)
            .await
    }

    /// Queue `line` for the supervising task and wait for its response
    pub async fn send_command(&self, line: &str, timeout: Duration) -> SupervisorResult<String> {
        if self.cancel.is_cancelled() {
            return Err(SupervisorError::NotRunning);
        }

        let (reply, response) = oneshot::channel();
        self.commands
            .send(PendingCommand {
                line: line.to_string(),
                timeout,
                reply,
            })
            .map_err(|_| SupervisorError::NotRunning)?;

        match tokio::time::timeout(timeout, response).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(SupervisorError::ChannelClosed),
            Err(_) => {
                warn!("Command {:?} timed out after {:?}", line, timeout);
                Err(SupervisorError::Timeout {
                    command: line.to_string(),
                    timeout,
                })
            }
        }
    }

    /// Call state from the most recent poll
    pub fn call_state(&self) -> SupervisorCallState {
        *self.state.borrow()
    }

    /// Observe call state changes
    pub fn subscribe(&self) -> watch::Receiver<SupervisorCallState> {
        self.state.clone()
    }

    /// Resolve when the supervising task ends
    ///
    /// An unexpected exit of the voice client yields
    /// [`SupervisorError::ProcessDied`]. Only the first caller observes the
    /// outcome, later calls return immediately.
    pub async fn wait(&self) -> SupervisorResult<()> {
        let task = self.supervisor_task.lock().take();
        match task {
            Some(task) => join(task).await,
            None => Ok(()),
        }
    }

    /// Terminate the voice client and stop both tasks
    pub async fn stop(&self) -> SupervisorResult<()> {
        if self.cancel.is_cancelled() {
            return Ok(());
        }
        info!("Stopping voice client");
        self.cancel.cancel();

        let reader = self.reader_task.lock().take();
        if let Some(reader) = reader {
            let _ = reader.await;
        }

        let task = self.supervisor_task.lock().take();
        match task {
            Some(task) => join(task).await,
            None => Ok(()),
        }
    }
}

impl Drop for SipSupervisor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn join(task: JoinHandle<SupervisorResult<()>>) -> SupervisorResult<()> {
    match task.await {
        Ok(result) => result,
        Err(e) => Err(SupervisorError::Io(io::Error::new(io::ErrorKind::Other, e))),
    }
}

fn exit_code(monitor: &mut dyn ProcessMonitor) -> Option<i32> {
    match monitor.try_wait() {
        Ok(ProcessStatus::Exited(code)) => code,
        _ => None,
    }
}

/// Reader task: one byte at a time into the prompt framer
async fn read_frames(
    stdout: Box<dyn AsyncRead + Send + Unpin>,
    frames: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
) {
    let mut reader = BufReader::new(stdout);
    let mut framer = PromptFramer::new();

    loop {
        let byte = tokio::select! {
            _ = cancel.cancelled() => break,
            byte = reader.read_u8() => byte,
        };

        match byte {
            Ok(byte) => {
                if let Some(frame) = framer.push(byte) {
                    trace!("Voice client response: {:?}", frame);
                    if frames.send(frame).is_err() {
                        break;
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!("Voice client closed its output");
                break;
            }
            Err(e) => {
                warn!("Reading voice client output failed: {}", e);
                break;
            }
        }
    }
}

enum FrameOutcome {
    Frame(String),
    TimedOut,
    Closed,
}

struct SupervisingCycle {
    stdin: Box<dyn AsyncWrite + Send + Unpin>,
    monitor: Box<dyn ProcessMonitor>,
    frames: mpsc::UnboundedReceiver<String>,
    commands: mpsc::UnboundedReceiver<PendingCommand>,
    handler: Arc<dyn CallEventHandler>,
    state: watch::Sender<SupervisorCallState>,
    /// Responses still owed for commands whose caller gave up
    stale_frames: usize,
    poll_interval: Duration,
    poll_timeout: Duration,
    cancel: CancellationToken,
}

impl SupervisingCycle {
    async fn run(mut self) -> SupervisorResult<()> {
        let mut result = self.cycle().await;
        if self.cancel.is_cancelled() {
            // Output closing underneath a requested stop is expected
            result = Ok(());
        }
        if let Err(e) = self.monitor.kill() {
            debug!("Terminating voice client: {}", e);
        }
        if let Err(ref e) = result {
            error!("Voice client supervision ended: {}", e);
        }
        result
    }

    async fn cycle(&mut self) -> SupervisorResult<()> {
        loop {
            if let ProcessStatus::Exited(code) = self.monitor.try_wait()? {
                return Err(SupervisorError::ProcessDied { code });
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(()),
                command = self.commands.recv() => match command {
                    Some(command) => self.execute(command).await?,
                    None => return Ok(()),
                },
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            self.poll_call_state().await?;
        }
    }

    async fn execute(&mut self, command: PendingCommand) -> SupervisorResult<()> {
        debug!("Sending {:?}", command.line);
        self.write_line(&command.line).await?;

        let reply = match self.next_frame(command.timeout).await {
            FrameOutcome::Frame(response) => Ok(response),
            FrameOutcome::TimedOut => Err(SupervisorError::Timeout {
                command: command.line,
                timeout: command.timeout,
            }),
            FrameOutcome::Closed => return Err(self.died()),
        };
        // The caller may have given up already
        let _ = command.reply.send(reply);
        Ok(())
    }

    async fn poll_call_state(&mut self) -> SupervisorResult<()> {
        self.write_line(protocol::CALL_LIST).await?;
        match self.next_frame(self.poll_timeout).await {
            FrameOutcome::Frame(response) => {
                self.apply(infer_call_state(&response));
                Ok(())
            }
            FrameOutcome::TimedOut => {
                warn!("Command {:?} timed out after {:?}", protocol::CALL_LIST, self.poll_timeout);
                Ok(())
            }
            FrameOutcome::Closed => Err(self.died()),
        }
    }

    async fn next_frame(&mut self, timeout: Duration) -> FrameOutcome {
        let deadline = Instant::now() + timeout;
        loop {
            match tokio::time::timeout_at(deadline, self.frames.recv()).await {
                Err(_) => {
                    self.stale_frames += 1;
                    return FrameOutcome::TimedOut;
                }
                Ok(None) => return FrameOutcome::Closed,
                Ok(Some(frame)) if self.stale_frames > 0 => {
                    self.stale_frames -= 1;
                    debug!("Discarding late response {:?}", frame);
                }
                Ok(Some(frame)) => return FrameOutcome::Frame(frame),
            }
        }
    }

    async fn write_line(&mut self, line: &str) -> SupervisorResult<()> {
        let written = async {
            self.stdin.write_all(line.as_bytes()).await?;
            self.stdin.write_all(b"\n").await?;
            self.stdin.flush().await
        }
        .await;

        match written {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Err(self.died()),
            Err(e) => Err(e.into()),
        }
    }

    fn died(&mut self) -> SupervisorError {
        SupervisorError::ProcessDied {
            code: exit_code(&mut *self.monitor),
        }
    }

    fn apply(&mut self, new: SupervisorCallState) {
        let old = *self.state.borrow();
        if old == new {
            return;
        }
        info!("Call state {:?} -> {:?}", old, new);

        use SupervisorCallState::*;
        if new == Incoming {
            self.handler.on_incoming_call();
        }
        if new == InCall {
            self.handler.on_call_connected();
        }
        if old == InCall || (new == Idle && matches!(old, Calling | Incoming)) {
            self.handler.on_call_hangup();
        }
        self.state.send_replace(new);
    }
}
