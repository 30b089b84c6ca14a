//! Centralized keyword tables.
//!
//! The scorer, the classifier and the policy all read these same lists so
//! they cannot disagree about what counts as forensically relevant, what
//! looks like a submit control, and what must never be tapped.

/// Keywords marking artifact-bearing app areas (messaging, media, social,
/// contacts, location, search history, settings, files).
pub const FORENSIC_KEYWORDS: &[&str] = &[
    "message", "chat", "conversation", "inbox", "send", "reply",
    "photo", "image", "video", "camera", "gallery", "media",
    "post", "comment", "like", "share", "feed", "story", "profile",
    "contact", "call", "phone", "dial",
    "location", "map", "place", "gps",
    "search", "history", "recent", "log",
    "setting", "account", "login", "password", "privacy",
    "file", "download", "save", "export", "backup",
];

/// Narrower send/post vocabulary. An element matching one of these gets a
/// bonus that outranks the generic forensic bonus, biasing the explorer
/// toward actions that create new artifacts.
pub const SUBMIT_KEYWORDS: &[&str] = &[
    "comment", "post", "send", "submit", "write", "reply",
    "댓글", "게시", "전송", "보내기", "작성", "답글",
];

/// Ordered patterns for the submit-discovery cascade: the explicit send
/// vocabulary first, confirm-style labels second. Korean equivalents ride
/// along in each tier; plenty of target apps label buttons only in Korean.
pub const SUBMIT_BUTTON_PATTERNS: &[&str] = &[
    "send", "post", "submit", "publish", "share", "reply", "comment",
    "전송", "보내기", "게시", "공유", "댓글", "답글", "작성",
    "done", "ok", "confirm", "apply", "save",
    "확인", "완료", "저장", "적용",
];

/// Hints that a focusable-but-not-clickable element is really a text input.
pub const INPUT_HINT_KEYWORDS: &[&str] = &[
    "comment", "write", "message", "post", "type", "search",
];

/// Elements whose combined text matches one of these are never tapped,
/// regardless of how the scorer ranked them. Checked before scoring.
pub const BLACKLIST_PATTERNS: &[&str] = &[
    "terms", "privacy", "policy",
    "report", "help", "contact us",
    "logout", "log out", "sign out", "delete account",
    "play.google", "app store", "market:",
    "external link",
    "about ads", "cookie",
];

/// Permission-dialog buttons to prefer.
pub const ALLOW_PATTERNS: &[&str] = &[
    "allow", "accept", "ok", "yes", "continue", "grant", "permit",
];

/// Permission-dialog buttons to avoid.
pub const DENY_PATTERNS: &[&str] = &[
    "deny", "cancel", "dismiss", "no", "later", "not now",
];

/// Activity-name fragments that mark a screen as not worth exploring.
pub const BORING_ACTIVITY_PATTERNS: &[&str] = &["terms", "policy", "license"];

/// A predefined keyword-driven exploration goal, attempted periodically
/// regardless of the default priority-driven selection.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    /// Scenarios that normally live behind the menu tab.
    pub via_menu: bool,
}

pub const FORENSIC_SCENARIOS: &[Scenario] = &[
    Scenario { name: "messenger", keywords: &["messenger", "messages", "chat"], via_menu: false },
    Scenario { name: "photos", keywords: &["photo", "camera", "gallery"], via_menu: false },
    Scenario { name: "settings", keywords: &["settings", "setting"], via_menu: true },
    Scenario { name: "saved", keywords: &["saved", "bookmark"], via_menu: true },
    Scenario { name: "profile", keywords: &["profile", "my page"], via_menu: true },
    Scenario { name: "downloads", keywords: &["download"], via_menu: false },
    Scenario { name: "privacy", keywords: &["privacy", "security"], via_menu: true },
];

/// True if `haystack` (already lowercased) contains any of the given needles.
pub fn matches_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|kw| haystack.contains(kw))
}

/// Blacklist check over an element's combined text. Blacklist wins over any
/// score bonus: callers filter before they rank.
pub fn is_blacklisted(haystack: &str) -> bool {
    matches_any(haystack, BLACKLIST_PATTERNS)
}
