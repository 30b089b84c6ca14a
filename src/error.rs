use std::fmt;
use std::process::ExitStatus;

#[derive(Debug)]
pub enum ExploreError {
    /// adb (or another device helper) failed to spawn
    DeviceSpawn { command: String, source: std::io::Error },

    /// Device command exited with a non-zero status
    DeviceFailed { command: String, status: ExitStatus, stderr: String },

    /// Device command exceeded its timeout and was killed
    DeviceTimeout { command: String, timeout_ms: u64 },

    /// UI hierarchy dump was empty or structurally unusable
    EmptyDump(String),

    /// JSON parsing failed (collaborator response or artifact)
    JsonParse { context: String, source: serde_json::Error },

    /// JSON serialization failed (collaborator request or artifact)
    JsonSerialize { context: String, source: serde_json::Error },

    /// Instrumentation agent host pipe error
    AgentIo(String),

    /// Instrumentation agent host replied with a protocol-level failure
    AgentProtocol { call: String, error: String },

    /// Vision classifier request failed
    Vision(String),

    /// Artifact file write failed
    Artifact { path: String, source: std::io::Error },

    /// Session cannot start (no device, target app missing)
    FatalInit(String),
}

impl fmt::Display for ExploreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExploreError::DeviceSpawn { command, source } => {
                write!(f, "Failed to spawn {} (is adb on PATH?): {}", command, source)
            }
            ExploreError::DeviceFailed { command, status, stderr } => {
                write!(f, "{} exited with {}: {}", command, status, stderr)
            }
            ExploreError::DeviceTimeout { command, timeout_ms } => {
                write!(f, "{} timed out after {}ms", command, timeout_ms)
            }
            ExploreError::EmptyDump(msg) => {
                write!(f, "Unusable UI dump: {}", msg)
            }
            ExploreError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            ExploreError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
            ExploreError::AgentIo(msg) => {
                write!(f, "Agent host I/O error: {}", msg)
            }
            ExploreError::AgentProtocol { call, error } => {
                write!(f, "Agent call '{}' failed: {}", call, error)
            }
            ExploreError::Vision(msg) => {
                write!(f, "Vision classifier failed: {}", msg)
            }
            ExploreError::Artifact { path, source } => {
                write!(f, "Could not write artifact '{}': {}", path, source)
            }
            ExploreError::FatalInit(msg) => {
                write!(f, "Cannot start session: {}", msg)
            }
        }
    }
}

impl std::error::Error for ExploreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExploreError::DeviceSpawn { source, .. } => Some(source),
            ExploreError::JsonParse { source, .. } => Some(source),
            ExploreError::JsonSerialize { source, .. } => Some(source),
            ExploreError::Artifact { source, .. } => Some(source),
            _ => None,
        }
    }
}
