use droid_explorer::snapshot::element::{Element, ElementKind};
use droid_explorer::state::tracker::{MAX_SAME_SCREEN, ScreenTracker};

fn button(x: i32, y: i32) -> Element {
    Element::synthetic(
        ElementKind::Button,
        x,
        y,
        100,
        80,
        Element::make_signature(ElementKind::Button, x, y, ""),
        40,
    )
}

// =========================================================================
// Screen hashing
// =========================================================================

#[test]
fn hash_survives_pixel_jitter() {
    let tracker = ScreenTracker::new();
    let a = tracker.compute_hash(&[button(150, 420), button(540, 1200)]);
    let b = tracker.compute_hash(&[button(155, 412), button(533, 1208)]);
    assert_eq!(a, b, "Sub-bucket jitter must not split the screen identity");
}

#[test]
fn hash_changes_when_layout_moves() {
    let tracker = ScreenTracker::new();
    let a = tracker.compute_hash(&[button(150, 420), button(540, 1200)]);
    let b = tracker.compute_hash(&[button(150, 420), button(540, 1900)]);
    assert_ne!(a, b, "A relocated element is a different screen");
}

#[test]
fn hash_is_sensitive_to_the_activity() {
    let mut tracker = ScreenTracker::new();
    let elements = [button(150, 420)];

    tracker.set_activity("com.app/.MainActivity");
    let a = tracker.compute_hash(&elements);
    tracker.set_activity("com.app/.SettingsActivity");
    let b = tracker.compute_hash(&elements);

    assert_ne!(a, b, "Same layout in a different activity is a different screen");
}

#[test]
fn empty_snapshot_has_a_sentinel_hash() {
    let tracker = ScreenTracker::new();
    assert_eq!(tracker.compute_hash(&[]), "empty_screen");
}

// =========================================================================
// Observation and loop detection
// =========================================================================

#[test]
fn repeated_screen_eventually_reports_stuck() {
    let mut tracker = ScreenTracker::new();

    let first = tracker.observe("h1");
    assert!(first.changed && first.first_visit);

    for i in 0..MAX_SAME_SCREEN {
        let obs = tracker.observe("h1");
        assert!(!obs.changed);
        assert!(!obs.stuck, "Not stuck yet after {} repeats", i + 1);
    }
    assert!(
        tracker.observe("h1").stuck,
        "Stuck once the same-screen counter passes the threshold"
    );
}

#[test]
fn ping_pong_between_two_screens_is_a_loop() {
    let mut tracker = ScreenTracker::new();
    for _ in 0..4 {
        tracker.observe("ha");
        tracker.observe("hb");
    }
    assert!(tracker.stuck_in_loop(), "Two screens alternating is a loop");

    tracker.reset_recent_hashes();
    assert!(!tracker.stuck_in_loop(), "Resetting the window clears the loop verdict");
}

#[test]
fn forward_progress_is_not_a_loop() {
    let mut tracker = ScreenTracker::new();
    for i in 0..8 {
        tracker.observe(&format!("h{}", i));
    }
    assert!(!tracker.stuck_in_loop(), "Fresh screens every step is progress");
}

// =========================================================================
// Transition history
// =========================================================================

#[test]
fn transition_outcomes_feed_element_stats() {
    let mut tracker = ScreenTracker::new();

    tracker.record_transition("s1", "button_5_10_noid", "s2", true);
    tracker.record_transition("s1", "button_5_10_noid", "s1", false);

    let stats = tracker.element_stats("s1", "button_5_10_noid").unwrap();
    assert_eq!(stats.attempts, 2);
    assert_eq!(stats.successes, 1);
    assert!(tracker.leads_to_new("s1", "button_5_10_noid"));
    assert!(tracker.element_stats("s1", "other").is_none());
}

#[test]
fn visited_marks_are_scoped_per_screen() {
    let mut tracker = ScreenTracker::new();
    tracker.mark_element_visited("s1", "sig");
    assert!(tracker.is_element_visited("s1", "sig"));
    assert!(
        !tracker.is_element_visited("s2", "sig"),
        "The same control on another screen is unvisited"
    );
}
