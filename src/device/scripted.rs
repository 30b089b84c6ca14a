use std::collections::VecDeque;
use std::path::Path;

use crate::device::channel::DeviceChannel;
use crate::error::ExploreError;

/// What the scripted device records for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Tap(i32, i32),
    Swipe(i32, i32, i32, i32),
    Key(String),
    Text(String),
    Broadcast(String),
    Launch(String),
    ForceStop(String),
    Screenshot,
}

/// In-memory device double used by tests: replays a queue of canned UI dumps
/// and foreground states, records every input it receives.
pub struct ScriptedDevice {
    pub dumps: VecDeque<String>,
    pub activity_dumps: VecDeque<String>,
    pub window_dumps: VecDeque<String>,
    pub screen: (i32, i32),
    pub calls: Vec<DeviceCall>,
    pub support_broadcast: bool,
    pub fail_launch: bool,
}

impl ScriptedDevice {
    pub fn new(screen: (i32, i32)) -> Self {
        ScriptedDevice {
            dumps: VecDeque::new(),
            activity_dumps: VecDeque::new(),
            window_dumps: VecDeque::new(),
            screen,
            calls: Vec::new(),
            support_broadcast: true,
            fail_launch: false,
        }
    }

    pub fn push_dump(&mut self, dump: impl Into<String>) {
        self.dumps.push_back(dump.into());
    }

    fn next_or_last(queue: &mut VecDeque<String>, what: &str) -> Result<String, ExploreError> {
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap_or_default())
        } else {
            queue
                .front()
                .cloned()
                .ok_or_else(|| ExploreError::EmptyDump(format!("scripted device has no {}", what)))
        }
    }
}

impl DeviceChannel for ScriptedDevice {
    fn ui_dump(&mut self) -> Result<String, ExploreError> {
        Self::next_or_last(&mut self.dumps, "ui dump")
    }

    fn window_dump(&mut self) -> Result<String, ExploreError> {
        Self::next_or_last(&mut self.window_dumps, "window dump")
    }

    fn activity_dump(&mut self) -> Result<String, ExploreError> {
        Self::next_or_last(&mut self.activity_dumps, "activity dump")
    }

    fn process_dump(&mut self) -> Result<String, ExploreError> {
        Ok(String::new())
    }

    fn recent_errors(&mut self) -> Result<String, ExploreError> {
        Ok(String::new())
    }

    fn tap(&mut self, x: i32, y: i32) -> Result<(), ExploreError> {
        self.calls.push(DeviceCall::Tap(x, y));
        Ok(())
    }

    fn swipe(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, _duration_ms: u64) -> Result<(), ExploreError> {
        self.calls.push(DeviceCall::Swipe(x1, y1, x2, y2));
        Ok(())
    }

    fn key_event(&mut self, code: &str) -> Result<(), ExploreError> {
        self.calls.push(DeviceCall::Key(code.to_string()));
        Ok(())
    }

    fn input_text(&mut self, text: &str) -> Result<(), ExploreError> {
        self.calls.push(DeviceCall::Text(text.to_string()));
        Ok(())
    }

    fn broadcast_text(&mut self, text: &str) -> Result<(), ExploreError> {
        if !self.support_broadcast {
            return Err(ExploreError::AgentIo("broadcast unsupported".into()));
        }
        self.calls.push(DeviceCall::Broadcast(text.to_string()));
        Ok(())
    }

    fn screen_size(&mut self) -> Result<(i32, i32), ExploreError> {
        Ok(self.screen)
    }

    fn screenshot(&mut self, _local_path: &Path) -> Result<(), ExploreError> {
        self.calls.push(DeviceCall::Screenshot);
        Ok(())
    }

    fn launch_app(&mut self, package: &str) -> Result<(), ExploreError> {
        if self.fail_launch {
            return Err(ExploreError::EmptyDump("scripted launch refused".into()));
        }
        self.calls.push(DeviceCall::Launch(package.to_string()));
        Ok(())
    }

    fn force_stop(&mut self, package: &str) -> Result<(), ExploreError> {
        self.calls.push(DeviceCall::ForceStop(package.to_string()));
        Ok(())
    }
}
