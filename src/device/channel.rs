use std::path::Path;
use std::time::Duration;

use crate::error::ExploreError;

/// Timeouts for the common call classes. UI dumps are cheap and frequent;
/// heavier actions get more headroom.
pub const DUMP_TIMEOUT: Duration = Duration::from_millis(4_000);
pub const QUICK_TIMEOUT: Duration = Duration::from_millis(1_500);
pub const ACTION_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Key codes the executor emits.
pub const KEY_BACK: &str = "KEYCODE_BACK";
pub const KEY_HOME: &str = "KEYCODE_HOME";
pub const KEY_ENTER: &str = "KEYCODE_ENTER";

/// Blocking request/response surface of the device command layer.
///
/// Every call carries an implicit timeout and surfaces failure as a typed
/// error; retries and connection management live behind the implementation,
/// not here. The exploration loop treats any error as a soft failure and
/// reassesses state on the next iteration.
pub trait DeviceChannel {
    /// Read the UI hierarchy document.
    fn ui_dump(&mut self) -> Result<String, ExploreError>;

    /// Coarser window/process hierarchy dump (secondary element source and
    /// crash heuristics).
    fn window_dump(&mut self) -> Result<String, ExploreError>;

    /// Activity-stack dump (foreground classification).
    fn activity_dump(&mut self) -> Result<String, ExploreError>;

    /// Process-state dump for the target package.
    fn process_dump(&mut self) -> Result<String, ExploreError>;

    /// Recent error-level diagnostic log lines.
    fn recent_errors(&mut self) -> Result<String, ExploreError>;

    fn tap(&mut self, x: i32, y: i32) -> Result<(), ExploreError>;

    fn swipe(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, duration_ms: u64) -> Result<(), ExploreError>;

    fn key_event(&mut self, code: &str) -> Result<(), ExploreError>;

    /// Plain-text injection; implementations restrict this to a safe
    /// character set.
    fn input_text(&mut self, text: &str) -> Result<(), ExploreError>;

    /// Structured text-injection channel (broadcast-style); preferred over
    /// `input_text` when the device supports it.
    fn broadcast_text(&mut self, text: &str) -> Result<(), ExploreError>;

    fn screen_size(&mut self) -> Result<(i32, i32), ExploreError>;

    fn screenshot(&mut self, local_path: &Path) -> Result<(), ExploreError>;

    fn launch_app(&mut self, package: &str) -> Result<(), ExploreError>;

    fn force_stop(&mut self, package: &str) -> Result<(), ExploreError>;
}
