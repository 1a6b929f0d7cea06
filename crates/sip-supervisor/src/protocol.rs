//! pjsua command shell wire format
//!
//! pjsua in `--use-cli` mode reads newline terminated commands on stdin and
//! terminates every response with a `>>>` prompt. Responses carry no other
//! delimiter, so framing scans the byte stream for the prompt.

use tracing::warn;

/// Prompt printed after every response
pub const PROMPT_MARKER: &[u8; 3] = b">>>";

/// Unterminated output kept before it is dropped
pub const MAX_PENDING: usize = 64 * 1024;

pub const CALL_LIST: &str = "call list";
pub const ANSWER_CALL: &str = "call answer 200";
pub const HANGUP_ALL: &str = "call hangup_all";

/// Command that dials `address`
pub fn call_new(address: &str) -> String {
    format!("call new sip:{}", address)
}

/// Call state as reported by `call list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupervisorCallState {
    #[default]
    Idle,
    Calling,
    Incoming,
    InCall,
}

/// Infer the call state from a `call list` response
///
/// The first line is a header, every further line ends in the call's
/// state. Any confirmed call wins over one still being set up, which in
/// turn wins over a ringing inbound call.
pub fn infer_call_state(response: &str) -> SupervisorCallState {
    let calls: Vec<&str> = response
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if calls.iter().any(|line| line.ends_with("[CONFIRMED]")) {
        SupervisorCallState::InCall
    } else if calls.iter().any(|line| line.ends_with("[CALLING]")) {
        SupervisorCallState::Calling
    } else if calls.iter().any(|line| line.ends_with("[INCOMING]")) {
        SupervisorCallState::Incoming
    } else {
        SupervisorCallState::Idle
    }
}

/// Splits the process output into prompt terminated responses
#[derive(Debug, Default)]
pub struct PromptFramer {
    buffer: Vec<u8>,
    window: [u8; 3],
}

impl PromptFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte, returns a trimmed response when a prompt completes
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if self.buffer.len() >= MAX_PENDING {
            warn!(
                "Dropping {} bytes of voice client output without a prompt",
                self.buffer.len()
            );
            self.buffer.clear();
        }
        self.buffer.push(byte);
        self.window = [self.window[1], self.window[2], byte];

        if self.buffer.len() < PROMPT_MARKER.len() || &self.window != PROMPT_MARKER {
            return None;
        }

        let body_len = self.buffer.len() - PROMPT_MARKER.len();
        let frame = String::from_utf8_lossy(&self.buffer[..body_len])
            .trim()
            .to_string();
        self.buffer.clear();
        self.window = [0; 3];
        Some(frame)
    }

    /// Bytes received since the last prompt
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
