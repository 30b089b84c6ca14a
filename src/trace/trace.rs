use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::policy::app_state::AppState;
use crate::policy::policy::Decision;

/// One line of the raw action history log.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub action: u64,

    pub app_state: String,
    pub activity: String,
    pub screen_hash: String,

    pub decision: Option<String>,
    pub target_signature: Option<String>,
    pub target_x: Option<i32>,
    pub target_y: Option<i32>,

    pub screen_changed: Option<bool>,
    pub note: Option<String>,
}

impl TraceEvent {
    pub fn now(action: u64, state: AppState, activity: &str, screen_hash: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            action,
            app_state: format!("{:?}", state),
            activity: activity.to_string(),
            screen_hash: screen_hash.to_string(),
            decision: None,
            target_signature: None,
            target_x: None,
            target_y: None,
            screen_changed: None,
            note: None,
        }
    }

    pub fn with_decision(mut self, decision: &Decision) -> Self {
        self.decision = Some(format!("{:?}", decision));
        self
    }

    pub fn with_target(mut self, signature: &str, x: i32, y: i32) -> Self {
        self.target_signature = Some(signature.to_string());
        self.target_x = Some(x);
        self.target_y = Some(y);
        self
    }

    pub fn with_result(mut self, screen_changed: bool) -> Self {
        self.screen_changed = Some(screen_changed);
        self
    }

    pub fn with_note(mut self, note: impl ToString) -> Self {
        self.note = Some(note.to_string());
        self
    }
}
