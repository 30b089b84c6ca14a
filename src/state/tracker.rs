use std::collections::{HashMap, HashSet, VecDeque};

use sha1::{Digest, Sha1};

use crate::snapshot::element::Element;

/// Coordinates are bucketed to this grid before hashing, so sub-threshold
/// render jitter cannot split one logical screen into many hashes.
const HASH_POSITION_BUCKET: i32 = 100;
/// Only the first N elements contribute to the hash.
const HASH_ELEMENT_COUNT: usize = 10;
/// Same-hash observations beyond this count mean "stuck on this screen".
pub const MAX_SAME_SCREEN: u32 = 5;
/// Loop-detection window length.
const RECENT_HASH_WINDOW: usize = 20;
/// A repeating cycle: the most recent 6 hashes hold at most 2 distinct values.
const LOOP_SAMPLE: usize = 6;
const LOOP_MAX_DISTINCT: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct ElementStats {
    pub attempts: u32,
    pub successes: u32,
}

impl ElementStats {
    pub fn success_rate(&self) -> f32 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f32 / self.attempts as f32
        }
    }
}

#[derive(Debug, Default)]
struct TransitionEntry {
    destinations: HashSet<String>,
    leads_to_new: bool,
}

#[derive(Debug)]
struct Visit {
    count: u32,
}

/// What one observation of the current screen told us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub changed: bool,
    pub first_visit: bool,
    pub stuck: bool,
}

/// Tracks screen identity across the session: hashing, revisit counts, the
/// loop-detection window, the transition graph and per-element outcome stats.
pub struct ScreenTracker {
    current_activity: String,
    last_hash: String,
    same_screen_count: u32,
    recent_hashes: VecDeque<String>,

    visits: HashMap<String, Visit>,
    transitions: HashMap<String, TransitionEntry>,
    element_stats: HashMap<String, ElementStats>,
    visited_elements: HashMap<String, HashSet<String>>,
    transition_count: u64,
}

impl ScreenTracker {
    pub fn new() -> Self {
        ScreenTracker {
            current_activity: String::new(),
            last_hash: String::new(),
            same_screen_count: 0,
            recent_hashes: VecDeque::new(),
            visits: HashMap::new(),
            transitions: HashMap::new(),
            element_stats: HashMap::new(),
            visited_elements: HashMap::new(),
            transition_count: 0,
        }
    }

    pub fn set_activity(&mut self, activity: &str) {
        self.current_activity = activity.to_string();
    }

    pub fn last_hash(&self) -> &str {
        &self.last_hash
    }

    pub fn screens_seen(&self) -> usize {
        self.visits.len()
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Stable hash of the current screen: the activity leaf plus the sorted,
    /// coarsely-bucketed positions of the first few elements. Sorting removes
    /// order sensitivity; bucketing absorbs pixel jitter. The digest is
    /// truncated to 8 hex chars — a false merge is tolerable, a false split
    /// only degrades loop detection.
    pub fn compute_hash(&self, elements: &[Element]) -> String {
        if elements.is_empty() {
            return "empty_screen".to_string();
        }

        let activity_leaf = self
            .current_activity
            .rsplit('/')
            .next()
            .unwrap_or("");

        let mut positions: Vec<String> = elements
            .iter()
            .take(HASH_ELEMENT_COUNT)
            .map(|e| {
                format!(
                    "{},{}",
                    e.center_x / HASH_POSITION_BUCKET,
                    e.center_y / HASH_POSITION_BUCKET
                )
            })
            .collect();
        positions.sort();

        let sig = format!("{}::{}", activity_leaf, positions.join("|"));
        short_hash(&sig)
    }

    /// Record one observation of `hash`. Increments the same-screen counter
    /// on a repeat, or registers the transition and resets it on a change.
    pub fn observe(&mut self, hash: &str) -> Observation {
        if hash == self.last_hash {
            self.same_screen_count += 1;
            let visit = self.visits.get(hash).map(|v| v.count).unwrap_or(0);
            return Observation {
                changed: false,
                first_visit: visit == 0,
                stuck: self.same_screen_count > MAX_SAME_SCREEN,
            };
        }

        if !self.last_hash.is_empty() {
            self.transition_count += 1;
        }

        self.last_hash = hash.to_string();
        self.same_screen_count = 0;

        self.recent_hashes.push_back(hash.to_string());
        if self.recent_hashes.len() > RECENT_HASH_WINDOW {
            self.recent_hashes.pop_front();
        }

        let first_visit = !self.visits.contains_key(hash);
        let visit = self
            .visits
            .entry(hash.to_string())
            .or_insert(Visit { count: 0 });
        visit.count += 1;

        Observation {
            changed: true,
            first_visit,
            stuck: false,
        }
    }

    /// Ping-pong detection over the recent-hash window; catches a small
    /// cycle of screens the same-screen counter cannot see.
    pub fn stuck_in_loop(&self) -> bool {
        if self.recent_hashes.len() < LOOP_SAMPLE {
            return false;
        }
        let recent: HashSet<&String> = self
            .recent_hashes
            .iter()
            .rev()
            .take(LOOP_SAMPLE)
            .collect();
        recent.len() <= LOOP_MAX_DISTINCT
    }

    fn key(screen: &str, signature: &str) -> String {
        format!("{}:{}", screen, signature)
    }

    /// Record the outcome of acting on `signature` from `from_screen`.
    pub fn record_transition(
        &mut self,
        from_screen: &str,
        signature: &str,
        to_screen: &str,
        success: bool,
    ) {
        let key = Self::key(from_screen, signature);

        let entry = self.transitions.entry(key.clone()).or_default();
        if entry.destinations.insert(to_screen.to_string()) {
            entry.leads_to_new = true;
        }

        let stats = self.element_stats.entry(key).or_default();
        stats.attempts += 1;
        if success {
            stats.successes += 1;
        }
    }

    pub fn element_stats(&self, screen: &str, signature: &str) -> Option<&ElementStats> {
        self.element_stats.get(&Self::key(screen, signature))
    }

    pub fn leads_to_new(&self, screen: &str, signature: &str) -> bool {
        self.transitions
            .get(&Self::key(screen, signature))
            .map(|t| t.leads_to_new)
            .unwrap_or(false)
    }

    pub fn mark_element_visited(&mut self, screen: &str, signature: &str) {
        self.visited_elements
            .entry(screen.to_string())
            .or_default()
            .insert(signature.to_string());
    }

    pub fn is_element_visited(&self, screen: &str, signature: &str) -> bool {
        self.visited_elements
            .get(screen)
            .map(|set| set.contains(signature))
            .unwrap_or(false)
    }

    /// Clears the loop-detection window (after a deliberate context switch
    /// such as a nav-tab change).
    pub fn reset_recent_hashes(&mut self) {
        self.recent_hashes.clear();
    }
}

impl Default for ScreenTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// sha1 truncated to 8 hex chars.
pub fn short_hash(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    digest[..4].iter().map(|b| format!("{:02x}", b)).collect()
}
