use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::ExploreError;

/// Request sent to the agent host over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AgentRequest {
    Plain { cmd: &'static str },
}

impl AgentRequest {
    pub fn init() -> Self {
        AgentRequest::Plain { cmd: "init" }
    }

    pub fn get_stats() -> Self {
        AgentRequest::Plain { cmd: "getStats" }
    }

    pub fn flush() -> Self {
        AgentRequest::Plain { cmd: "flush" }
    }

    pub fn scan_open_files() -> Self {
        AgentRequest::Plain { cmd: "scanOpenFiles" }
    }

    pub fn trigger_memory_scan() -> Self {
        AgentRequest::Plain { cmd: "triggerMemoryScan" }
    }

    pub fn quit() -> Self {
        AgentRequest::Plain { cmd: "quit" }
    }
}

/// One buffered filesystem-path event drained from the agent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathEvent {
    pub path: String,
    #[serde(default)]
    pub context: String,
}

/// Hook-level counters the agent reports.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AgentStats {
    #[serde(default)]
    pub events: u64,
    #[serde(default)]
    pub hooks_active: u64,
}

/// Response received from the agent host over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct AgentResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub stats: Option<AgentStats>,
    #[serde(default)]
    pub events: Vec<PathEvent>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Which optional agent operations this session supports. An operation is
/// assumed available until it fails with a protocol error once; after that
/// it stays marked unavailable for the rest of the session instead of being
/// re-probed on every call.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub open_file_scan: bool,
    pub memory_scan: bool,
    pub flush: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            open_file_scan: true,
            memory_scan: true,
            flush: true,
        }
    }
}

/// A persistent session with the instrumentation agent host.
///
/// Spawns a long-lived host process attached to the target app. Commands go
/// out as NDJSON over stdin, responses come back one JSON line each.
pub struct AgentSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
}

impl AgentSession {
    /// Launch the host and wait for its ready line.
    pub fn launch(program: &str, args: &[String]) -> Result<Self, ExploreError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExploreError::DeviceSpawn {
                command: program.to_string(),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExploreError::AgentIo("failed to capture agent host stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExploreError::AgentIo("failed to capture agent host stdout".into()))?;

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| ExploreError::AgentIo(format!("failed to read ready signal: {}", e)))?;

        let response: AgentResponse = serde_json::from_str(line.trim()).map_err(|e| {
            ExploreError::JsonParse {
                context: "agent host ready signal".into(),
                source: e,
            }
        })?;

        if !response.ok || response.ready != Some(true) {
            return Err(ExploreError::AgentProtocol {
                call: "launch".into(),
                error: response
                    .error
                    .unwrap_or_else(|| "no ready signal from agent host".into()),
            });
        }

        Ok(AgentSession {
            child,
            stdin,
            reader,
        })
    }

    fn send(&mut self, request: &AgentRequest) -> Result<AgentResponse, ExploreError> {
        let json = serde_json::to_string(request).map_err(|e| ExploreError::JsonSerialize {
            context: "AgentRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json)
            .map_err(|e| ExploreError::AgentIo(format!("failed to write to agent host: {}", e)))?;
        self.stdin
            .flush()
            .map_err(|e| ExploreError::AgentIo(format!("failed to flush agent host stdin: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| ExploreError::AgentIo(format!("failed to read from agent host: {}", e)))?;

        if line.trim().is_empty() {
            return Err(ExploreError::AgentIo(
                "empty response from agent host (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| ExploreError::JsonParse {
            context: "agent host response".into(),
            source: e,
        })
    }

    fn send_ok(
        &mut self,
        request: &AgentRequest,
        command_name: &str,
    ) -> Result<AgentResponse, ExploreError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(ExploreError::AgentProtocol {
                call: command_name.into(),
                error: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Install hooks in the target process; returns the active hook list.
    pub fn init(&mut self) -> Result<Vec<String>, ExploreError> {
        let response = self.send_ok(&AgentRequest::init(), "init")?;
        Ok(response.hooks)
    }

    pub fn get_stats(&mut self) -> Result<AgentStats, ExploreError> {
        let response = self.send_ok(&AgentRequest::get_stats(), "getStats")?;
        Ok(response.stats.unwrap_or_default())
    }

    /// Drain all path events the agent has buffered since the last flush.
    pub fn flush(&mut self) -> Result<Vec<PathEvent>, ExploreError> {
        let response = self.send_ok(&AgentRequest::flush(), "flush")?;
        Ok(response.events)
    }

    /// One-shot scan of the target's open file descriptors.
    pub fn scan_open_files(&mut self) -> Result<Vec<String>, ExploreError> {
        let response = self.send_ok(&AgentRequest::scan_open_files(), "scanOpenFiles")?;
        Ok(response.paths)
    }

    /// Ask the agent to sweep process memory for path-like strings; returns
    /// how many new ones it found.
    pub fn trigger_memory_scan(&mut self) -> Result<u64, ExploreError> {
        let response = self.send_ok(&AgentRequest::trigger_memory_scan(), "triggerMemoryScan")?;
        Ok(response.count.unwrap_or(0))
    }

    pub fn quit(&mut self) {
        let _ = self.send(&AgentRequest::quit());
        let _ = self.child.wait();
    }
}

impl Drop for AgentSession {
    fn drop(&mut self) {
        self.quit();
    }
}

/// Best-effort facade over an optional [`AgentSession`]. Every operation is
/// a no-op when the agent is absent or a call has failed; an I/O failure
/// drops the session so the policy's periodic liveness duty can re-attach.
pub struct Instrumentation {
    program: Option<String>,
    args: Vec<String>,
    session: Option<AgentSession>,
    pub capabilities: Capabilities,
    pub events_flushed: u64,
}

impl Instrumentation {
    /// `program = None` disables instrumentation entirely.
    pub fn new(program: Option<String>, args: Vec<String>) -> Self {
        Instrumentation {
            program,
            args,
            session: None,
            capabilities: Capabilities::default(),
            events_flushed: 0,
        }
    }

    /// (Re-)attach the agent if configured and not already attached.
    pub fn ensure_attached(&mut self) {
        if self.session.is_some() {
            return;
        }
        let Some(program) = self.program.clone() else {
            return;
        };
        match AgentSession::launch(&program, &self.args) {
            Ok(mut session) => match session.init() {
                Ok(hooks) => {
                    println!("[agent] attached, {} hooks active", hooks.len());
                    self.session = Some(session);
                }
                Err(e) => eprintln!("[agent] init failed: {}", e),
            },
            Err(e) => eprintln!("[agent] attach failed: {}", e),
        }
    }

    /// Liveness check: a failing getStats drops the session.
    pub fn check_alive(&mut self) {
        if let Some(session) = &mut self.session {
            if session.get_stats().is_err() {
                eprintln!("[agent] session lost, will re-attach");
                self.session = None;
            }
        }
    }

    pub fn stats(&mut self) -> AgentStats {
        match self.session.as_mut().map(|s| s.get_stats()) {
            Some(Ok(stats)) => stats,
            Some(Err(_)) => {
                self.session = None;
                AgentStats::default()
            }
            None => AgentStats::default(),
        }
    }

    pub fn flush(&mut self) -> Vec<PathEvent> {
        if !self.capabilities.flush {
            return Vec::new();
        }
        match self.session.as_mut().map(|s| s.flush()) {
            Some(Ok(events)) => {
                self.events_flushed += events.len() as u64;
                events
            }
            Some(Err(e)) => {
                self.note_failure("flush", &e, |caps| caps.flush = false);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn scan_open_files(&mut self) -> Vec<String> {
        if !self.capabilities.open_file_scan {
            return Vec::new();
        }
        match self.session.as_mut().map(|s| s.scan_open_files()) {
            Some(Ok(paths)) => paths,
            Some(Err(e)) => {
                self.note_failure("scanOpenFiles", &e, |caps| caps.open_file_scan = false);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn trigger_memory_scan(&mut self) -> u64 {
        if !self.capabilities.memory_scan {
            return 0;
        }
        match self.session.as_mut().map(|s| s.trigger_memory_scan()) {
            Some(Ok(count)) => count,
            Some(Err(e)) => {
                self.note_failure("triggerMemoryScan", &e, |caps| caps.memory_scan = false);
                0
            }
            None => 0,
        }
    }

    /// A protocol error means the agent rejected the operation: mark the
    /// capability unavailable. An I/O error means the session died: drop it
    /// and keep the capability for the next attach.
    fn note_failure(
        &mut self,
        op: &str,
        err: &ExploreError,
        disable: impl FnOnce(&mut Capabilities),
    ) {
        eprintln!("[agent] {} failed: {}", op, err);
        match err {
            ExploreError::AgentProtocol { .. } => disable(&mut self.capabilities),
            _ => self.session = None,
        }
    }
}
