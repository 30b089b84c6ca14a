use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Grid size for the tried-coordinate set. Taps from different snapshots
/// that land within the same bucket count as the same action.
pub const TRIED_BUCKET: i32 = 10;
/// Partial resets keep this many of the most recently tried buckets.
pub const PARTIAL_RESET_KEEP: usize = 30;

/// Small deterministic generator (64-bit LCG, MMIX constants). Sessions are
/// reproducible for a given seed, which the tests rely on.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: seed.wrapping_mul(2862933555777941757).wrapping_add(3037000493),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 33) as u32
    }

    /// Uniform pick in `0..n`. `n = 0` returns 0.
    pub fn pick(&mut self, n: usize) -> usize {
        if n <= 1 {
            0
        } else {
            self.next_u32() as usize % n
        }
    }
}

/// Session-wide counters exported into the final summary.
#[derive(Debug, Clone, Default)]
pub struct Coverage {
    pub activities: HashSet<String>,
    pub inputs_filled: u64,
    pub submits_found: u64,
    pub scrolls: u64,
    pub crashes: u64,
    pub scenarios_executed: u64,
}

/// All mutable state of one exploration session, threaded explicitly through
/// every decision. Nothing here is shared; the loop is the only writer.
pub struct SessionState {
    pub package: String,
    pub screen: (i32, i32),
    pub started: Instant,
    pub deadline: Instant,

    pub action_count: u64,
    /// How many forward taps deep the session is; back presses and
    /// relaunches walk it down or zero it.
    pub depth: u32,
    pub stuck_count: u32,
    /// Consecutive "no untried element" occurrences, drives the escape ladder.
    pub exhausted_streak: u32,

    pub coverage: Coverage,
    pub scenarios_done: HashSet<usize>,
    pub rng: Rng,
    /// Structured text-injection broadcast channel; marked unavailable on
    /// its first failure instead of being re-probed every input.
    pub broadcast_input: bool,

    /// Insertion-ordered tried-coordinate buckets.
    tried: Vec<(i32, i32)>,
    tried_set: HashSet<(i32, i32)>,
}

impl SessionState {
    pub fn new(package: &str, screen: (i32, i32), budget: Duration, seed: u64) -> Self {
        let now = Instant::now();
        SessionState {
            package: package.to_string(),
            screen,
            started: now,
            deadline: now + budget,
            action_count: 0,
            depth: 0,
            stuck_count: 0,
            exhausted_streak: 0,
            coverage: Coverage::default(),
            scenarios_done: HashSet::new(),
            rng: Rng::new(seed),
            broadcast_input: true,
            tried: Vec::new(),
            tried_set: HashSet::new(),
        }
    }

    pub fn time_left(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    fn bucket(x: i32, y: i32) -> (i32, i32) {
        (x / TRIED_BUCKET, y / TRIED_BUCKET)
    }

    pub fn mark_tried(&mut self, x: i32, y: i32) {
        let b = Self::bucket(x, y);
        if self.tried_set.insert(b) {
            self.tried.push(b);
        }
    }

    pub fn is_tried(&self, x: i32, y: i32) -> bool {
        self.tried_set.contains(&Self::bucket(x, y))
    }

    pub fn tried_count(&self) -> usize {
        self.tried.len()
    }

    /// Drop all tried buckets except the most recent few, so the explorer
    /// can revisit old ground without immediately repeating its last taps.
    pub fn partial_reset_tried(&mut self) {
        if self.tried.len() > PARTIAL_RESET_KEEP {
            let keep_from = self.tried.len() - PARTIAL_RESET_KEEP;
            self.tried.drain(..keep_from);
        }
        self.tried_set = self.tried.iter().copied().collect();
    }

    pub fn full_reset_tried(&mut self) {
        self.tried.clear();
        self.tried_set.clear();
    }

    /// Any successful state-changing action lands here.
    pub fn note_progress(&mut self) {
        self.stuck_count = 0;
        self.exhausted_streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionState {
        SessionState::new("com.example.app", (1080, 2340), Duration::from_secs(60), 7)
    }

    #[test]
    fn nearby_taps_share_a_bucket() {
        let mut s = session();
        s.mark_tried(105, 203);
        assert!(s.is_tried(109, 209));
        assert!(!s.is_tried(130, 203));
    }

    #[test]
    fn partial_reset_keeps_most_recent_buckets() {
        let mut s = session();
        for i in 0..50 {
            s.mark_tried(i * 20, 0);
        }
        s.partial_reset_tried();
        assert_eq!(s.tried_count(), PARTIAL_RESET_KEEP);
        assert!(s.is_tried(49 * 20, 0));
        assert!(!s.is_tried(0, 0));
    }

    #[test]
    fn rng_is_deterministic_for_a_seed() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }
}
