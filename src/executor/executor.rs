use std::thread::sleep;
use std::time::Duration;

use crate::device::channel::{DeviceChannel, KEY_BACK, KEY_ENTER};
use crate::error::ExploreError;
use crate::executor::submit::{self, SubmitTarget};
use crate::policy::session::SessionState;
use crate::snapshot::element::{Element, ElementKind};
use crate::snapshot::parser::parse_hierarchy;

const KEYBOARD_WAIT: Duration = Duration::from_millis(600);
const TYPE_SETTLE: Duration = Duration::from_millis(300);
const SUBMIT_SETTLE: Duration = Duration::from_millis(1000);
const TOGGLE_SETTLE: Duration = Duration::from_millis(300);
const SCROLL_SETTLE: Duration = Duration::from_millis(500);
const TAP_SETTLE: Duration = Duration::from_millis(800);

/// Per-character fallback only handles short strings.
const MAX_KEYCODE_TEXT: usize = 15;

pub fn tap_element(device: &mut dyn DeviceChannel, elem: &Element) -> Result<(), ExploreError> {
    device.tap(elem.center_x, elem.center_y)
}

/// Tap dispatch for non-input kinds: submit-style taps wait longer for the
/// resulting screen, toggles barely need to settle.
pub fn execute_tap(
    device: &mut dyn DeviceChannel,
    session: &mut SessionState,
    elem: &Element,
) -> Result<(), ExploreError> {
    tap_element(device, elem)?;
    match elem.kind {
        ElementKind::ButtonSubmit | ElementKind::Fab => {
            session.coverage.submits_found += 1;
            sleep(SUBMIT_SETTLE);
        }
        ElementKind::Checkbox | ElementKind::Radio | ElementKind::Switch => {
            sleep(TOGGLE_SETTLE);
        }
        ElementKind::Webview => sleep(SUBMIT_SETTLE),
        _ => sleep(TAP_SETTLE),
    }
    Ok(())
}

/// Vertical content scroll; direction alternates via the session rng with
/// an upward bias, matching how a feed is normally consumed.
pub fn scroll_content(
    device: &mut dyn DeviceChannel,
    session: &mut SessionState,
) -> Result<(), ExploreError> {
    let (w, h) = session.screen;
    let x = w / 2;
    let up = session.rng.pick(10) < 7;
    let (y1, y2) = if up { (h * 3 / 5, h / 4) } else { (h / 4, h * 3 / 5) };
    device.swipe(x, y1, x, y2, 250)?;
    session.coverage.scrolls += 1;
    sleep(SCROLL_SETTLE);
    Ok(())
}

pub fn swipe_up(device: &mut dyn DeviceChannel, screen: (i32, i32)) -> Result<(), ExploreError> {
    let (w, h) = screen;
    device.swipe(w / 2, h * 5 / 8, w / 2, h / 5, 300)
}

pub fn press_back(device: &mut dyn DeviceChannel) -> Result<(), ExploreError> {
    device.key_event(KEY_BACK)
}

pub fn press_back_n(device: &mut dyn DeviceChannel, n: u32) -> Result<(), ExploreError> {
    for _ in 0..n {
        device.key_event(KEY_BACK)?;
        sleep(Duration::from_millis(400));
    }
    Ok(())
}

pub fn press_enter(device: &mut dyn DeviceChannel) -> Result<(), ExploreError> {
    device.key_event(KEY_ENTER)
}

/// Plain-text channel only accepts a safe subset: whitespace becomes the
/// `%s` escape, everything outside `[a-zA-Z0-9@._%-]` is dropped.
pub fn sanitize_for_input_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some("%s".to_string())
            } else if c.is_ascii_alphanumeric() || "@._%-".contains(c) {
                Some(c.to_string())
            } else {
                None
            }
        })
        .collect()
}

/// Android key codes for the per-character fallback. Digits, lowercase
/// letters and a handful of symbols only.
pub fn keycode_for_char(c: char) -> Option<String> {
    match c {
        '0'..='9' => Some((7 + c as u32 - '0' as u32).to_string()),
        'a'..='z' => Some((29 + c as u32 - 'a' as u32).to_string()),
        '@' => Some("77".to_string()),
        '.' => Some("56".to_string()),
        '-' | '_' => Some("69".to_string()),
        _ => None,
    }
}

/// Text-injection ladder: structured broadcast (until its first failure),
/// then the sanitized plain-text channel, then per-character key codes for
/// short strings. Returns whether any rung landed.
pub fn type_text(
    device: &mut dyn DeviceChannel,
    session: &mut SessionState,
    text: &str,
) -> bool {
    if session.broadcast_input {
        match device.broadcast_text(text) {
            Ok(()) => {
                sleep(TYPE_SETTLE);
                return true;
            }
            Err(e) => {
                eprintln!("[executor] broadcast input unavailable: {}", e);
                session.broadcast_input = false;
            }
        }
    }

    let sanitized = sanitize_for_input_text(text);
    if !sanitized.is_empty() && device.input_text(&sanitized).is_ok() {
        sleep(TYPE_SETTLE);
        return true;
    }

    if text.len() <= MAX_KEYCODE_TEXT {
        let mut any = false;
        for c in text.to_lowercase().chars() {
            if let Some(code) = keycode_for_char(c) {
                if device.key_event(&code).is_ok() {
                    any = true;
                }
                sleep(Duration::from_millis(50));
            }
        }
        if any {
            sleep(TYPE_SETTLE);
            return true;
        }
    }

    false
}

/// Value to type into an input of the given kind. The nonce keeps repeated
/// fills distinguishable in the target app's own data.
pub fn fill_value(kind: ElementKind, nonce: u64) -> String {
    let n = nonce % 1000;
    match kind {
        ElementKind::InputComment => "nice".to_string(),
        ElementKind::InputMessage => format!("msg{}", n),
        ElementKind::InputSearch => "test".to_string(),
        ElementKind::InputEmail => format!("t{}@t.com", n % 100),
        ElementKind::InputPassword => "Test123".to_string(),
        ElementKind::InputPhone => "01012345678".to_string(),
        ElementKind::InputName => "testuser".to_string(),
        _ => format!("test{}", n),
    }
}

/// Full input sequence: tap, wait for the keyboard, inject text, then commit
/// via the submit cascade (search fields just press enter). The cascade runs
/// against a fresh hierarchy dump since the keyboard usually reflows the
/// screen.
pub fn run_input_sequence(
    device: &mut dyn DeviceChannel,
    session: &mut SessionState,
    elem: &Element,
) -> Result<(), ExploreError> {
    tap_element(device, elem)?;
    sleep(KEYBOARD_WAIT);

    let value = fill_value(elem.kind, session.action_count);
    if type_text(device, session, &value) {
        session.coverage.inputs_filled += 1;
    }
    sleep(TYPE_SETTLE);

    if elem.kind == ElementKind::InputSearch {
        press_enter(device)?;
        sleep(TAP_SETTLE);
        return Ok(());
    }

    let fresh = match device.ui_dump() {
        Ok(xml) => parse_hierarchy(&xml, session.screen),
        Err(_) => Vec::new(),
    };
    match submit::find_submit(&fresh, elem, session.screen) {
        SubmitTarget::Element(i) => {
            tap_element(device, &fresh[i])?;
            session.coverage.submits_found += 1;
        }
        SubmitTarget::EnterKey => {
            press_enter(device)?;
            sleep(TYPE_SETTLE);
            press_enter(device)?;
        }
    }
    sleep(SUBMIT_SETTLE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::scripted::{DeviceCall, ScriptedDevice};

    fn session() -> SessionState {
        SessionState::new("com.example.app", (1080, 2340), Duration::from_secs(60), 3)
    }

    #[test]
    fn sanitizer_escapes_whitespace_and_strips_the_rest() {
        assert_eq!(sanitize_for_input_text("hi there"), "hi%sthere");
        assert_eq!(sanitize_for_input_text("a@b.c_d-e"), "a@b.c_d-e");
        assert_eq!(sanitize_for_input_text("héllo!"), "hllo");
    }

    #[test]
    fn keycodes_cover_digits_and_letters() {
        assert_eq!(keycode_for_char('0').as_deref(), Some("7"));
        assert_eq!(keycode_for_char('9').as_deref(), Some("16"));
        assert_eq!(keycode_for_char('a').as_deref(), Some("29"));
        assert_eq!(keycode_for_char('z').as_deref(), Some("54"));
        assert_eq!(keycode_for_char('@').as_deref(), Some("77"));
        assert_eq!(keycode_for_char('!'), None);
    }

    #[test]
    fn broadcast_failure_falls_back_and_is_not_retried() {
        let mut device = ScriptedDevice::new((1080, 2340));
        device.support_broadcast = false;
        let mut s = session();
        assert!(type_text(&mut device, &mut s, "hello"));
        assert!(!s.broadcast_input);
        assert!(device.calls.contains(&DeviceCall::Text("hello".to_string())));

        device.calls.clear();
        assert!(type_text(&mut device, &mut s, "again"));
        assert_eq!(device.calls, vec![DeviceCall::Text("again".to_string())]);
    }
}
