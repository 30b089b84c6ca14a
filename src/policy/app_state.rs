use crate::score::keywords::{self, ALLOW_PATTERNS, BORING_ACTIVITY_PATTERNS, DENY_PATTERNS};
use crate::snapshot::element::Element;

/// Where the target app currently is, judged from the activity dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    InApp,
    OutOfApp,
    Launcher,
    Unknown,
}

/// Foreground classification result.
#[derive(Debug, Clone)]
pub struct Foreground {
    pub state: AppState,
    pub activity: String,
}

/// Classify the foreground from a `dumpsys activity` style dump: find the
/// resumed (or focused) component, then bucket its package.
pub fn classify_foreground(activity_dump: &str, package: &str) -> Foreground {
    let component = extract_component(activity_dump, "mResumedActivity")
        .or_else(|| extract_component(activity_dump, "mCurrentFocus"))
        .or_else(|| extract_component(activity_dump, "topResumedActivity"));

    let Some(component) = component else {
        return Foreground {
            state: AppState::Unknown,
            activity: "unknown".to_string(),
        };
    };

    let pkg = component.split('/').next().unwrap_or("");
    let state = if pkg.contains("launcher") || pkg.contains("home") {
        AppState::Launcher
    } else if component.contains(package) {
        AppState::InApp
    } else {
        AppState::OutOfApp
    };

    Foreground {
        state,
        activity: component,
    }
}

/// Pull the `pkg/Activity` token out of the first line mentioning `marker`.
/// The token is the first whitespace-separated word containing a slash.
fn extract_component(dump: &str, marker: &str) -> Option<String> {
    for line in dump.lines() {
        if !line.contains(marker) {
            continue;
        }
        let interesting = line.split('{').nth(1).unwrap_or(line);
        for word in interesting.split_whitespace() {
            if word.contains('/') {
                return Some(word.trim_end_matches('}').to_string());
            }
        }
    }
    None
}

const SYSTEM_DIALOG_PACKAGES: &[&str] = &["com.android.server.am", "android", "com.android.systemui"];
const PROCESS_CRASH_KEYWORDS: &[&str] = &["crash", "error", "not responding", "stopped"];

/// Crash heuristic 1: the focused window belongs to a system dialog package
/// while the target app no longer has focus.
pub fn system_dialog_has_focus(window_dump: &str, package: &str) -> bool {
    let Some(focused) = focused_window_owner(window_dump) else {
        return false;
    };
    let is_system = SYSTEM_DIALOG_PACKAGES.iter().any(|p| focused.contains(p));
    is_system && !focused.contains(package)
}

fn focused_window_owner(window_dump: &str) -> Option<String> {
    let line = window_dump.lines().find(|l| l.contains("mCurrentFocus"))?;
    let inner = line.split('{').nth(1)?;
    // Last token before any '/', e.g. "u0 com.example.app/com.example.Main"
    let token = inner
        .split_whitespace()
        .last()?
        .split('/')
        .next()?
        .trim_end_matches('}');
    Some(token.to_string())
}

/// Crash heuristic 2: the process dump section for the package contains an
/// error-state keyword within the lines right after its first mention.
pub fn process_in_error_state(process_dump: &str, package: &str) -> bool {
    let Some(idx) = process_dump.find(package) else {
        return false;
    };
    let section: String = process_dump[idx..]
        .lines()
        .take(10)
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase();
    PROCESS_CRASH_KEYWORDS.iter().any(|kw| section.contains(kw))
}

/// Crash heuristic 3: a fatal-exception signature plus the package name in
/// the recent error-level log lines.
pub fn fatal_in_logs(logcat: &str, package: &str) -> bool {
    logcat.contains("FATAL EXCEPTION") && logcat.contains(package)
}

/// Where the "close app" button of a system crash dialog usually sits.
pub fn crash_dismiss_point(screen: (i32, i32)) -> (i32, i32) {
    let (w, h) = screen;
    (w / 4, h * 85 / 100)
}

const BORING_LONG_TEXT_LEN: usize = 100;
const BORING_LONG_TEXT_COUNT: usize = 5;

/// Legalese and license screens are dead weight: back out immediately.
pub fn is_boring_screen(activity: &str, elements: &[Element]) -> bool {
    let leaf = activity.rsplit('/').next().unwrap_or(activity).to_lowercase();
    if keywords::matches_any(&leaf, BORING_ACTIVITY_PATTERNS) {
        return true;
    }
    let long_texts = elements
        .iter()
        .filter(|e| e.text.len() > BORING_LONG_TEXT_LEN)
        .count();
    long_texts >= BORING_LONG_TEXT_COUNT
}

/// A runtime-permission dialog shows an allow-style and a deny-style button
/// together. The policy taps the allow side.
pub fn permission_allow_index(elements: &[Element]) -> Option<usize> {
    let has_deny = elements
        .iter()
        .any(|e| e.clickable && keywords::matches_any(&e.haystack(), DENY_PATTERNS));
    if !has_deny {
        return None;
    }
    elements.iter().position(|e| {
        e.clickable
            && keywords::matches_any(&e.haystack(), ALLOW_PATTERNS)
            && !keywords::matches_any(&e.haystack(), DENY_PATTERNS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::element::ElementKind;

    #[test]
    fn resumed_activity_in_target_package_is_in_app() {
        let dump = "  mResumedActivity: ActivityRecord{1234 u0 com.example.app/.MainActivity t42}";
        let fg = classify_foreground(dump, "com.example.app");
        assert_eq!(fg.state, AppState::InApp);
        assert!(fg.activity.contains("MainActivity"));
    }

    #[test]
    fn launcher_package_is_classified_as_launcher() {
        let dump = "  mResumedActivity: ActivityRecord{1 u0 com.google.android.apps.nexuslauncher/.NexusLauncherActivity t1}";
        let fg = classify_foreground(dump, "com.example.app");
        assert_eq!(fg.state, AppState::Launcher);
    }

    #[test]
    fn system_dialog_focus_counts_as_crash_signal() {
        let dump = "  mCurrentFocus=Window{abc u0 com.android.systemui/AlertDialog}";
        assert!(system_dialog_has_focus(dump, "com.example.app"));
        let own = "  mCurrentFocus=Window{abc u0 com.example.app/com.example.Main}";
        assert!(!system_dialog_has_focus(own, "com.example.app"));
    }

    #[test]
    fn permission_dialog_prefers_allow_over_deny() {
        let mut allow = Element::synthetic(ElementKind::Button, 300, 1800, 200, 80, "a".into(), 40);
        allow.text = "Allow".into();
        let mut deny = Element::synthetic(ElementKind::Button, 700, 1800, 200, 80, "d".into(), 40);
        deny.text = "Deny".into();
        let elements = vec![deny, allow];
        assert_eq!(permission_allow_index(&elements), Some(1));
    }
}
