//! In-memory stand-in for the pjsua command shell

use fetap_sip_supervisor::{
    CallEventHandler, ProcessLauncher, ProcessMonitor, ProcessStatus, SupervisorConfig,
    VoiceProcess,
};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Shared {
    calls: Vec<String>,
    received: Vec<String>,
    delays: HashMap<String, Duration>,
    exit_code: Option<i32>,
    killed: bool,
    launched: Option<(PathBuf, Vec<String>)>,
}

/// Scriptable fake voice client
#[derive(Clone, Default)]
pub struct FakePjsua {
    shared: Arc<Mutex<Shared>>,
    close_output: CancellationToken,
    no_banner: bool,
}

impl FakePjsua {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close stdout before printing the banner
    pub fn crashing_on_startup() -> Self {
        Self {
            no_banner: true,
            ..Self::default()
        }
    }

    /// Replace the call lines reported by `call list`
    pub fn set_calls(&self, calls: &[&str]) {
        self.shared.lock().unwrap().calls = calls.iter().map(|c| c.to_string()).collect();
    }

    /// Answer `command` only after `delay`
    pub fn delay_response(&self, command: &str, delay: Duration) {
        self.shared
            .lock()
            .unwrap()
            .delays
            .insert(command.to_string(), delay);
    }

    /// Make the process report that it exited
    pub fn exit(&self, code: i32) {
        self.shared.lock().unwrap().exit_code = Some(code);
    }

    /// Close the process output
    pub fn close_output(&self) {
        self.close_output.cancel();
    }

    pub fn received(&self) -> Vec<String> {
        self.shared.lock().unwrap().received.clone()
    }

    pub fn has_received(&self, command: &str) -> bool {
        self.received().iter().any(|c| c == command)
    }

    pub fn was_killed(&self) -> bool {
        self.shared.lock().unwrap().killed
    }

    pub fn launched(&self) -> Option<(PathBuf, Vec<String>)> {
        self.shared.lock().unwrap().launched.clone()
    }

    async fn serve(self, input: DuplexStream, mut output: DuplexStream) {
        if self.no_banner {
            return;
        }
        if output.write_all(b"PJSUA v2.14.1 fake\nReady\n>>> ").await.is_err() {
            return;
        }

        let mut lines = BufReader::new(input).lines();
        loop {
            let line = tokio::select! {
                _ = self.close_output.cancelled() => return,
                line = lines.next_line() => match line {
                    Ok(Some(line)) => line,
                    _ => return,
                },
            };

            let (delay, response) = {
                let mut shared = self.shared.lock().unwrap();
                shared.received.push(line.clone());
                let delay = shared.delays.get(&line).copied();
                let response = if line == "call list" {
                    format!("Call list:\n{}\n>>> ", shared.calls.join("\n"))
                } else {
                    "OK\n>>> ".to_string()
                };
                (delay, response)
            };

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if output.write_all(response.as_bytes()).await.is_err() {
                return;
            }
        }
    }
}

impl ProcessLauncher for FakePjsua {
    fn launch(&self, program: &Path, args: &[String]) -> io::Result<VoiceProcess> {
        self.shared.lock().unwrap().launched = Some((program.to_path_buf(), args.to_vec()));

        let (stdin, fake_in) = tokio::io::duplex(4096);
        let (fake_out, stdout) = tokio::io::duplex(4096);
        tokio::spawn(self.clone().serve(fake_in, fake_out));

        Ok(VoiceProcess {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            monitor: Box::new(FakeMonitor { pjsua: self.clone() }),
        })
    }
}

struct FakeMonitor {
    pjsua: FakePjsua,
}

impl ProcessMonitor for FakeMonitor {
    fn try_wait(&mut self) -> io::Result<ProcessStatus> {
        let shared = self.pjsua.shared.lock().unwrap();
        Ok(match (shared.exit_code, shared.killed) {
            (Some(code), _) => ProcessStatus::Exited(Some(code)),
            (None, true) => ProcessStatus::Exited(None),
            (None, false) => ProcessStatus::Running,
        })
    }

    fn kill(&mut self) -> io::Result<()> {
        self.pjsua.shared.lock().unwrap().killed = true;
        self.pjsua.close_output();
        Ok(())
    }
}

/// Counts callbacks
#[derive(Default)]
pub struct CountingHandler {
    pub incoming: AtomicUsize,
    pub connected: AtomicUsize,
    pub hangup: AtomicUsize,
}

impl CountingHandler {
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.incoming.load(Ordering::SeqCst),
            self.connected.load(Ordering::SeqCst),
            self.hangup.load(Ordering::SeqCst),
        )
    }
}

impl CallEventHandler for CountingHandler {
    fn on_incoming_call(&self) {
        self.incoming.fetch_add(1, Ordering::SeqCst);
    }

    fn on_call_connected(&self) {
        self.connected.fetch_add(1, Ordering::SeqCst);
    }

    fn on_call_hangup(&self) {
        self.hangup.fetch_add(1, Ordering::SeqCst);
    }
}

/// Config pointing at an existing file so nothing is downloaded
pub fn test_config(binary: &Path) -> SupervisorConfig {
    SupervisorConfig {
        binary_path: binary.to_path_buf(),
        download_url: "http://127.0.0.1:9/pjsua".to_string(),
        command_timeout_ms: 1_000,
        startup_timeout_ms: 1_000,
        poll_interval_ms: 5,
        ..Default::default()
    }
}

/// Poll `condition` until it holds or two seconds pass
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
