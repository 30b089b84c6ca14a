use crate::nav::tabs::NavDetector;
use crate::policy::app_state;
use crate::policy::session::SessionState;
use crate::score::keywords::{self, FORENSIC_SCENARIOS};
use crate::score::priority::dynamic_scores;
use crate::snapshot::element::Element;
use crate::state::tracker::ScreenTracker;

// ===== Cadences (action-count modulo) =====

pub const HOME_RETURN_INTERVAL: u64 = 30;
pub const SCROLL_INTERVAL: u64 = 5;
pub const NAV_PREF_INTERVAL: u64 = 5;
pub const SCENARIO_INTERVAL: u64 = 50;
pub const AGENT_CHECK_INTERVAL: u64 = 15;
pub const OPEN_FILE_SCAN_INTERVAL: u64 = 3;
pub const MEMORY_SCAN_INTERVAL: u64 = 9;

/// How many top-ranked candidates the random pick draws from.
const PICK_POOL: usize = 3;

/// What the executor should do this iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Tap the element at this index in the current element list.
    Tap { index: usize },
    /// Run the input sequence on the element at this index.
    FillInput { index: usize },
    /// Scroll the main content area.
    Scroll,
    /// Tap the navigation tab at this index in the nav detector's list.
    TapTab { tab: usize },
    /// Back press (boring screen, escape rung 2).
    Back,
    /// Forced return toward the app's home screen.
    HomeReturn,
    /// Run a forensic scenario by index into the scenario table.
    RunScenario { scenario: usize },
    /// Escape rung 3-4: tap a heuristic nav position, partially forget
    /// tried coordinates.
    ForcedNav,
    /// Escape rung 5+: home-return, readiness check, re-attach, full reset.
    FullEscape,
}

/// Best-effort background duties due this iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Duties {
    pub agent_check: bool,
    pub flush: bool,
    pub open_file_scan: bool,
    pub memory_scan: bool,
}

pub fn duties_for(action_count: u64) -> Duties {
    if action_count == 0 {
        return Duties::default();
    }
    Duties {
        agent_check: action_count % AGENT_CHECK_INTERVAL == 0,
        flush: action_count % AGENT_CHECK_INTERVAL == 0,
        open_file_scan: action_count % OPEN_FILE_SCAN_INTERVAL == 0,
        memory_scan: action_count % MEMORY_SCAN_INTERVAL == 0,
    }
}

/// Pick the next action for the current screen.
///
/// Candidate filtering is blacklist-first: a blacklisted element never
/// reaches scoring no matter how high it would rank. Tried state lives in
/// the session's coarse coordinate set so near-identical taps across
/// snapshots count as already done.
pub fn select_action(
    session: &mut SessionState,
    tracker: &ScreenTracker,
    nav: &NavDetector,
    elements: &[Element],
    activity: &str,
) -> Decision {
    // Dialog and dead-end screens preempt everything.
    if let Some(index) = app_state::permission_allow_index(elements) {
        return Decision::Tap { index };
    }
    if app_state::is_boring_screen(activity, elements) {
        return Decision::Back;
    }

    let count = session.action_count;

    if count > 0 && count % HOME_RETURN_INTERVAL == 0 {
        return Decision::HomeReturn;
    }

    if count > 0 && count % SCENARIO_INTERVAL == 0 {
        if let Some(scenario) = (0..FORENSIC_SCENARIOS.len())
            .find(|i| !session.scenarios_done.contains(i))
        {
            return Decision::RunScenario { scenario };
        }
    }

    let has_scrollable = elements.iter().any(|e| e.scrollable);
    if count > 0 && count % SCROLL_INTERVAL == 0 && has_scrollable {
        return Decision::Scroll;
    }

    if count > 0 && count % NAV_PREF_INTERVAL == 0 {
        if let Some((tab, t)) = nav.next_unvisited() {
            if !session.is_tried(t.x, t.y) {
                return Decision::TapTab { tab };
            }
        }
    }

    // Untried, non-blacklisted interactive elements.
    let untried: Vec<usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            !keywords::is_blacklisted(&e.haystack()) && !session.is_tried(e.center_x, e.center_y)
        })
        .map(|(i, _)| i)
        .collect();

    if untried.is_empty() {
        session.exhausted_streak += 1;
        return match session.exhausted_streak {
            1 => Decision::Scroll,
            2 => Decision::Back,
            3 | 4 => Decision::ForcedNav,
            _ => Decision::FullEscape,
        };
    }
    session.exhausted_streak = 0;

    // Inputs come first while any remain untried.
    if let Some(&index) = untried.iter().find(|&&i| elements[i].kind.is_input()) {
        return Decision::FillInput { index };
    }

    // History-aware ranking over the untried set, then a small random pick
    // among the leaders to avoid deterministic ruts.
    let ranked = dynamic_scores(elements, tracker, tracker.last_hash());
    let ordered: Vec<usize> = ranked
        .into_iter()
        .map(|(i, _)| i)
        .filter(|i| untried.contains(i))
        .collect();
    if ordered.is_empty() {
        let index = untried[session.rng.pick(untried.len())];
        return Decision::Tap { index };
    }
    let pool = ordered.len().min(PICK_POOL);
    let index = ordered[session.rng.pick(pool)];
    Decision::Tap { index }
}

/// Heuristic forced-nav position for escape rungs 3-4: middle of the bottom
/// bar, where most apps keep a tab that leads somewhere else.
pub fn forced_nav_point(screen: (i32, i32)) -> (i32, i32) {
    (screen.0 / 2, screen.1 - 80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::element::ElementKind;
    use std::time::Duration;

    fn session() -> SessionState {
        SessionState::new("com.example.app", (1080, 2340), Duration::from_secs(60), 1)
    }

    fn clickable(cx: i32, cy: i32) -> Element {
        Element::synthetic(ElementKind::Clickable, cx, cy, 80, 80, format!("c_{}", cx), 25)
    }

    #[test]
    fn escape_ladder_escalates_while_everything_is_tried() {
        let mut s = session();
        s.action_count = 1;
        let tracker = ScreenTracker::new();
        let nav = NavDetector::new();
        let elem = clickable(200, 600);
        s.mark_tried(200, 600);
        let elements = vec![elem];

        let steps: Vec<Decision> = (0..6)
            .map(|_| select_action(&mut s, &tracker, &nav, &elements, "com.example.app/.Main"))
            .collect();
        assert_eq!(steps[0], Decision::Scroll);
        assert_eq!(steps[1], Decision::Back);
        assert_eq!(steps[2], Decision::ForcedNav);
        assert_eq!(steps[3], Decision::ForcedNav);
        assert_eq!(steps[4], Decision::FullEscape);
        assert_eq!(steps[5], Decision::FullEscape);
    }

    #[test]
    fn new_untried_element_resets_the_escape_streak() {
        let mut s = session();
        s.action_count = 1;
        s.exhausted_streak = 4;
        let tracker = ScreenTracker::new();
        let nav = NavDetector::new();
        let elements = vec![clickable(200, 600)];
        let d = select_action(&mut s, &tracker, &nav, &elements, "com.example.app/.Main");
        assert!(matches!(d, Decision::Tap { .. }));
        assert_eq!(s.exhausted_streak, 0);
    }

    #[test]
    fn untried_inputs_take_precedence_over_plain_taps() {
        let mut s = session();
        s.action_count = 1;
        let tracker = ScreenTracker::new();
        let nav = NavDetector::new();
        let input = Element::synthetic(
            ElementKind::InputText,
            300,
            900,
            400,
            60,
            "in".into(),
            35,
        );
        let elements = vec![clickable(200, 600), input];
        let d = select_action(&mut s, &tracker, &nav, &elements, "com.example.app/.Main");
        assert_eq!(d, Decision::FillInput { index: 1 });
    }

    #[test]
    fn home_return_fires_on_its_cadence() {
        let mut s = session();
        s.action_count = HOME_RETURN_INTERVAL;
        let tracker = ScreenTracker::new();
        let nav = NavDetector::new();
        let elements = vec![clickable(200, 600)];
        let d = select_action(&mut s, &tracker, &nav, &elements, "com.example.app/.Main");
        assert_eq!(d, Decision::HomeReturn);
    }

    #[test]
    fn blacklisted_elements_are_never_candidates() {
        let mut s = session();
        s.action_count = 1;
        let tracker = ScreenTracker::new();
        let nav = NavDetector::new();
        let mut bad = clickable(200, 600);
        bad.text = "Log out".into();
        let d = select_action(&mut s, &tracker, &nav, &vec![bad], "com.example.app/.Main");
        // Only element is blacklisted, so the escape ladder starts.
        assert_eq!(d, Decision::Scroll);
    }

    #[test]
    fn duties_follow_their_intervals() {
        assert_eq!(duties_for(0), Duties::default());
        let d = duties_for(45);
        assert!(d.agent_check && d.flush);
        assert!(d.open_file_scan);
        assert!(d.memory_scan);
        let d = duties_for(7);
        assert!(!d.agent_check && !d.open_file_scan && !d.memory_scan);
    }
}
