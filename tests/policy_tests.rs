use std::time::Duration;

use droid_explorer::nav::tabs::NavDetector;
use droid_explorer::policy::app_state;
use droid_explorer::policy::policy::{self, Decision};
use droid_explorer::policy::recovery::{self, Remedy};
use droid_explorer::policy::session::SessionState;
use droid_explorer::snapshot::element::{Element, ElementKind};
use droid_explorer::state::tracker::ScreenTracker;

const SCREEN: (i32, i32) = (1080, 2340);

fn session() -> SessionState {
    SessionState::new("com.example.app", SCREEN, Duration::from_secs(600), 7)
}

fn labeled(kind: ElementKind, cx: i32, cy: i32, text: &str) -> Element {
    let mut e = Element::synthetic(
        kind,
        cx,
        cy,
        120,
        80,
        Element::make_signature(kind, cx, cy, ""),
        25,
    );
    e.text = text.to_string();
    e
}

fn select(
    session: &mut SessionState,
    nav: &NavDetector,
    elements: &[Element],
) -> Decision {
    let tracker = ScreenTracker::new();
    policy::select_action(session, &tracker, nav, elements, "com.example.app/.Main")
}

// =========================================================================
// Preemptive screens
// =========================================================================

#[test]
fn permission_dialog_taps_the_allow_side() {
    let elements = vec![
        labeled(ElementKind::Button, 300, 1500, "Deny"),
        labeled(ElementKind::Button, 780, 1500, "Allow"),
    ];
    let decision = select(&mut session(), &NavDetector::new(), &elements);
    assert_eq!(decision, Decision::Tap { index: 1 }, "Allow button wins on a permission dialog");
}

#[test]
fn allow_without_deny_is_not_a_permission_dialog() {
    let elements = vec![labeled(ElementKind::Button, 780, 1500, "Allow notifications")];
    assert_eq!(
        app_state::permission_allow_index(&elements),
        None,
        "A lone allow-vocabulary button is not a dialog"
    );
}

#[test]
fn license_wall_backs_out() {
    let wall = "x".repeat(150);
    let elements: Vec<Element> = (0..5)
        .map(|i| labeled(ElementKind::Clickable, 540, 300 + i * 300, &wall))
        .collect();
    let decision = select(&mut session(), &NavDetector::new(), &elements);
    assert_eq!(decision, Decision::Back, "A wall of long text is a dead end");
}

#[test]
fn boring_activity_name_backs_out_too() {
    let mut s = session();
    let tracker = ScreenTracker::new();
    let elements = vec![labeled(ElementKind::Button, 540, 800, "Next")];
    let decision = policy::select_action(
        &mut s,
        &tracker,
        &NavDetector::new(),
        &elements,
        "com.example.app/.LicenseActivity",
    );
    assert_eq!(decision, Decision::Back);
}

// =========================================================================
// Cadenced moves
// =========================================================================

#[test]
fn scenario_slot_picks_the_first_undone_scenario() {
    let mut s = session();
    s.action_count = 50;
    s.scenarios_done.insert(0);
    let elements = vec![labeled(ElementKind::Button, 540, 800, "Next")];
    assert_eq!(
        select(&mut s, &NavDetector::new(), &elements),
        Decision::RunScenario { scenario: 1 },
        "Scenario 0 is done, so the slot advances to 1"
    );
}

#[test]
fn scroll_slot_requires_a_scrollable_element() {
    let mut s = session();
    s.action_count = 10;
    let mut list = labeled(ElementKind::Scrollable, 540, 1200, "");
    list.scrollable = true;
    let elements = vec![labeled(ElementKind::Button, 540, 300, "Next"), list];
    assert_eq!(select(&mut s, &NavDetector::new(), &elements), Decision::Scroll);

    let mut s = session();
    s.action_count = 10;
    let mut nav = NavDetector::new();
    nav.update(&[], SCREEN);
    let flat = vec![labeled(ElementKind::Button, 540, 300, "Next")];
    assert_eq!(
        select(&mut s, &nav, &flat),
        Decision::TapTab { tab: 0 },
        "Without scrollables the interval falls through to the nav preference"
    );
}

#[test]
fn nav_preference_skips_already_tried_tab_positions() {
    let mut s = session();
    s.action_count = 5;
    let mut nav = NavDetector::new();
    nav.update(&[], SCREEN); // synthetic five-tab bar
    let elements = vec![labeled(ElementKind::Button, 540, 300, "Next")];
    assert_eq!(select(&mut s, &nav, &elements), Decision::TapTab { tab: 0 });

    // Same iteration again, but the first tab's position was already tapped.
    let mut s = session();
    s.action_count = 5;
    let first = nav.tabs()[0].clone();
    s.mark_tried(first.x, first.y);
    match select(&mut s, &nav, &elements) {
        Decision::TapTab { .. } => panic!("Tried tab position must not be re-tapped"),
        _ => {}
    }
}

// =========================================================================
// Recovery ladder wiring
// =========================================================================

const LADDER: [Remedy; 5] = [
    Remedy::Back,
    Remedy::DoubleBack,
    Remedy::SwipeBack,
    Remedy::HomeRelaunch,
    Remedy::FullRecovery,
];

/// One loop iteration's worth of stuck accounting: observe, and escalate
/// only when the observation says the session is stuck.
fn observe_and_recover(
    tracker: &mut ScreenTracker,
    session: &mut SessionState,
    hash: &str,
) -> Option<Remedy> {
    let obs = tracker.observe(hash);
    if obs.stuck || tracker.stuck_in_loop() {
        Some(recovery::escalate(session))
    } else {
        None
    }
}

#[test]
fn frozen_screen_walks_every_recovery_rung_in_order() {
    let mut tracker = ScreenTracker::new();
    let mut s = session();

    let mut remedies = Vec::new();
    for _ in 0..60 {
        if let Some(r) = observe_and_recover(&mut tracker, &mut s, "c0ffee01") {
            remedies.push(r);
        }
        if remedies.len() == LADDER.len() {
            break;
        }
    }
    assert_eq!(
        remedies, LADDER,
        "The first recovery on a frozen screen must be Back, not full recovery"
    );
}

#[test]
fn progress_between_recoveries_restarts_the_ladder() {
    let mut tracker = ScreenTracker::new();
    let mut s = session();

    let mut remedies = Vec::new();
    while remedies.len() < 2 {
        if let Some(r) = observe_and_recover(&mut tracker, &mut s, "c0ffee01") {
            remedies.push(r);
        }
    }
    assert_eq!(remedies, [Remedy::Back, Remedy::DoubleBack]);

    // The second rung worked: a judged screen change resets the counter.
    assert!(tracker.observe("deadbe02").changed);
    s.note_progress();

    let mut next = None;
    while next.is_none() {
        next = observe_and_recover(&mut tracker, &mut s, "deadbe02");
    }
    assert_eq!(
        next,
        Some(Remedy::Back),
        "After progress the ladder starts over at the bottom rung"
    );
}

#[test]
fn ping_pong_loop_escalates_to_full_recovery() {
    let mut tracker = ScreenTracker::new();
    let mut s = session();

    // Two screens bouncing back and forth: every observation is a change,
    // but no action is judged successful between recoveries.
    let mut remedies = Vec::new();
    for i in 0..60 {
        let hash = if i % 2 == 0 { "aaaa1111" } else { "bbbb2222" };
        if let Some(r) = observe_and_recover(&mut tracker, &mut s, hash) {
            remedies.push(r);
        }
        if remedies.len() == LADDER.len() {
            break;
        }
    }
    assert_eq!(
        remedies, LADDER,
        "A two-screen cycle must climb the ladder instead of pressing Back forever"
    );

    // Full recovery clears the loop window, so the cycle has to re-form
    // before another recovery can fire.
    s.stuck_count = 0;
    tracker.reset_recent_hashes();
    assert!(!tracker.stuck_in_loop());
    assert_eq!(observe_and_recover(&mut tracker, &mut s, "aaaa1111"), None);
}
