use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::instrument::client::PathEvent;

/// Path substrings worth keeping: app-private storage, shared storage, and
/// the messenger data directories that matter for artifact discovery.
const SUBSTRING_PATTERNS: &[&str] = &[
    "/data/data/",
    "/data/user/",
    "/data/user_de/",
    "/data/app/",
    "/data/misc/",
    "/storage/emulated/",
    "/sdcard/",
    "/mnt/sdcard/",
    "/Android/data/",
    "/Android/media/",
    "/Android/obb/",
    "shared_prefs",
    "/cache/",
    "/files/",
    "/databases/",
    "lib-compressed",
    "lib-main",
    "app_",
];

/// Case-insensitive directory names in shared storage.
const DIR_PATTERNS: &[&str] = &[
    "/download/",
    "/dcim/",
    "/pictures/",
    "/documents/",
    "/movies/",
    "/music/",
];

/// Case-insensitive file extensions.
const SUFFIX_PATTERNS: &[&str] = &[
    ".db", ".sqlite", ".sqlite3", ".so", ".dex", ".odex", ".vdex", ".art", ".oat", ".apk",
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".mp4", ".mp3", ".m4a", ".3gp", ".pdf", ".doc",
    ".xls", ".json", ".xml", ".txt", ".log",
];

/// Case-insensitive app-name markers anywhere in the path.
const APP_PATTERNS: &[&str] = &[
    "whatsapp", "telegram", "kakaotalk", "line", "signal", "facebook", "instagram", "twitter",
    "tiktok",
];

/// True when the path matches any pattern in the relevance tables.
pub fn is_relevant(path: &str) -> bool {
    if SUBSTRING_PATTERNS.iter().any(|p| path.contains(p)) {
        return true;
    }
    let lower = path.to_lowercase();
    SUFFIX_PATTERNS.iter().any(|s| lower.ends_with(s))
        || DIR_PATTERNS.iter().any(|d| lower.contains(d))
        || APP_PATTERNS.iter().any(|a| lower.contains(a))
}

#[derive(Debug, Clone, Serialize)]
pub struct PathRecord {
    pub path: String,
    pub context: String,
    pub count: u64,
    pub first_seen_ms: u64,
}

/// Deduplicating store of forensically relevant paths observed during the
/// session. First-seen context wins; repeats only bump the count.
#[derive(Default)]
pub struct PathStore {
    records: HashMap<String, PathRecord>,
    pub filtered: u64,
}

impl PathStore {
    pub fn new() -> Self {
        PathStore::default()
    }

    pub fn unique_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&mut self, event: &PathEvent) {
        if !is_relevant(&event.path) {
            self.filtered += 1;
            return;
        }
        match self.records.get_mut(&event.path) {
            Some(existing) => existing.count += 1,
            None => {
                let context = if event.context.is_empty() {
                    "unknown".to_string()
                } else {
                    event.context.clone()
                };
                self.records.insert(
                    event.path.clone(),
                    PathRecord {
                        path: event.path.clone(),
                        context,
                        count: 1,
                        first_seen_ms: now_ms(),
                    },
                );
            }
        }
    }

    pub fn record_bare(&mut self, path: &str, context: &str) {
        self.record(&PathEvent {
            path: path.to_string(),
            context: context.to_string(),
        });
    }

    /// Records sorted by path for stable output.
    pub fn sorted_records(&self) -> Vec<&PathRecord> {
        let mut out: Vec<&PathRecord> = self.records.values().collect();
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }

    /// `Path,Context,Count,Timestamp` with quoted string fields.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("Path,Context,Count,Timestamp\n");
        for rec in self.sorted_records() {
            csv.push_str(&format!(
                "\"{}\",\"{}\",{},{}\n",
                rec.path.replace('"', "\"\""),
                rec.context.replace('"', "\"\""),
                rec.count,
                rec.first_seen_ms
            ));
        }
        csv
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
