use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::device::channel::{ACTION_TIMEOUT, DUMP_TIMEOUT, DeviceChannel, QUICK_TIMEOUT};
use crate::error::ExploreError;

const DUMP_REMOTE_PATH: &str = "/sdcard/ui_dump.xml";
const SCREENSHOT_REMOTE_PATH: &str = "/sdcard/explorer_screen.png";

/// Device channel backed by the `adb` binary, one subprocess per call with
/// an enforced wall-clock timeout.
pub struct AdbChannel {
    serial: Option<String>,
}

impl AdbChannel {
    pub fn new(serial: Option<String>) -> Self {
        AdbChannel { serial }
    }

    /// Verify a device is answering; fatal-init check before the loop starts.
    pub fn probe(&mut self) -> Result<(), ExploreError> {
        let out = self.run(&["shell", "echo", "ready"], QUICK_TIMEOUT)?;
        if out.trim() != "ready" {
            return Err(ExploreError::FatalInit(format!(
                "device probe returned '{}'",
                out.trim()
            )));
        }
        Ok(())
    }

    /// Verify the target package is installed; fatal-init check.
    pub fn package_installed(&mut self, package: &str) -> Result<bool, ExploreError> {
        let out = self.run(&["shell", "pm", "path", package], ACTION_TIMEOUT)?;
        Ok(out.contains("package:"))
    }

    fn run(&mut self, args: &[&str], timeout: Duration) -> Result<String, ExploreError> {
        let mut full: Vec<&str> = Vec::new();
        if let Some(serial) = &self.serial {
            full.push("-s");
            full.push(serial);
        }
        full.extend_from_slice(args);

        let command_label = format!("adb {}", args.join(" "));

        let mut child = Command::new("adb")
            .args(&full)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExploreError::DeviceSpawn {
                command: command_label.clone(),
                source: e,
            })?;

        // Drain pipes on helper threads so a large dump cannot fill the pipe
        // and wedge the child before the timeout fires.
        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let out_reader = thread::spawn(move || {
            let mut buf = String::new();
            if let Some(pipe) = stdout.as_mut() {
                let _ = pipe.read_to_string(&mut buf);
            }
            buf
        });
        let err_reader = thread::spawn(move || {
            let mut buf = String::new();
            if let Some(pipe) = stderr.as_mut() {
                let _ = pipe.read_to_string(&mut buf);
            }
            buf
        });

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ExploreError::DeviceTimeout {
                            command: command_label,
                            timeout_ms: timeout.as_millis() as u64,
                        });
                    }
                    thread::sleep(Duration::from_millis(20));
                }
                Err(e) => {
                    return Err(ExploreError::DeviceSpawn {
                        command: command_label,
                        source: e,
                    });
                }
            }
        };

        let out = out_reader.join().unwrap_or_default();
        let err = err_reader.join().unwrap_or_default();

        // Some shell verbs report benign non-zero exits; only hard-fail when
        // we also got nothing back.
        if !status.success() && out.is_empty() {
            return Err(ExploreError::DeviceFailed {
                command: command_label,
                status,
                stderr: if err.is_empty() { out } else { err },
            });
        }

        Ok(out)
    }
}

impl DeviceChannel for AdbChannel {
    fn ui_dump(&mut self) -> Result<String, ExploreError> {
        self.run(&["shell", "uiautomator", "dump", DUMP_REMOTE_PATH], DUMP_TIMEOUT)?;
        thread::sleep(Duration::from_millis(100));
        let out = self.run(&["shell", "cat", DUMP_REMOTE_PATH], QUICK_TIMEOUT)?;

        if !out.contains("<node") {
            return Err(ExploreError::EmptyDump("no <node> tags in dump".into()));
        }
        Ok(out)
    }

    fn window_dump(&mut self) -> Result<String, ExploreError> {
        self.run(&["shell", "dumpsys", "window", "windows"], QUICK_TIMEOUT)
    }

    fn activity_dump(&mut self) -> Result<String, ExploreError> {
        self.run(&["shell", "dumpsys", "activity", "activities"], QUICK_TIMEOUT)
    }

    fn process_dump(&mut self) -> Result<String, ExploreError> {
        self.run(&["shell", "dumpsys", "activity", "processes"], QUICK_TIMEOUT)
    }

    fn recent_errors(&mut self) -> Result<String, ExploreError> {
        self.run(&["shell", "logcat", "-d", "-t", "30", "*:E"], QUICK_TIMEOUT)
    }

    fn tap(&mut self, x: i32, y: i32) -> Result<(), ExploreError> {
        self.run(
            &["shell", "input", "tap", &x.to_string(), &y.to_string()],
            ACTION_TIMEOUT,
        )?;
        Ok(())
    }

    fn swipe(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, duration_ms: u64) -> Result<(), ExploreError> {
        self.run(
            &[
                "shell",
                "input",
                "swipe",
                &x1.to_string(),
                &y1.to_string(),
                &x2.to_string(),
                &y2.to_string(),
                &duration_ms.to_string(),
            ],
            ACTION_TIMEOUT,
        )?;
        Ok(())
    }

    fn key_event(&mut self, code: &str) -> Result<(), ExploreError> {
        self.run(&["shell", "input", "keyevent", code], ACTION_TIMEOUT)?;
        Ok(())
    }

    fn input_text(&mut self, text: &str) -> Result<(), ExploreError> {
        self.run(&["shell", "input", "text", text], ACTION_TIMEOUT)?;
        Ok(())
    }

    fn broadcast_text(&mut self, text: &str) -> Result<(), ExploreError> {
        self.run(
            &[
                "shell", "am", "broadcast", "-a", "ADB_INPUT_TEXT", "--es", "msg", text,
            ],
            ACTION_TIMEOUT,
        )?;
        Ok(())
    }

    fn screen_size(&mut self) -> Result<(i32, i32), ExploreError> {
        let out = self.run(&["shell", "wm", "size"], QUICK_TIMEOUT)?;
        parse_screen_size(&out).ok_or_else(|| {
            ExploreError::FatalInit(format!("could not parse screen size from '{}'", out.trim()))
        })
    }

    fn screenshot(&mut self, local_path: &Path) -> Result<(), ExploreError> {
        self.run(&["shell", "screencap", "-p", SCREENSHOT_REMOTE_PATH], ACTION_TIMEOUT)?;
        let local = local_path.to_string_lossy().to_string();
        self.run(&["pull", SCREENSHOT_REMOTE_PATH, &local], ACTION_TIMEOUT)?;
        Ok(())
    }

    fn launch_app(&mut self, package: &str) -> Result<(), ExploreError> {
        self.run(
            &[
                "shell", "monkey", "-p", package, "-c", "android.intent.category.LAUNCHER", "1",
            ],
            ACTION_TIMEOUT,
        )?;
        Ok(())
    }

    fn force_stop(&mut self, package: &str) -> Result<(), ExploreError> {
        self.run(&["shell", "am", "force-stop", package], ACTION_TIMEOUT)?;
        Ok(())
    }
}

/// Parse "Physical size: 1080x2400" style output.
pub fn parse_screen_size(out: &str) -> Option<(i32, i32)> {
    for token in out.split_whitespace() {
        if let Some((w, h)) = token.split_once('x') {
            if let (Ok(w), Ok(h)) = (w.parse::<i32>(), h.parse::<i32>()) {
                if w > 0 && h > 0 {
                    return Some((w, h));
                }
            }
        }
    }
    None
}
