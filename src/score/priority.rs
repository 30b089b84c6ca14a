use crate::score::keywords::{FORENSIC_KEYWORDS, SUBMIT_KEYWORDS, matches_any};
use crate::snapshot::element::{Element, ElementKind};
use crate::state::tracker::ScreenTracker;

/// Base weight per semantic kind. The absolute numbers are tuned, not
/// principled; the ordering submit-keyword > navigation > generic input >
/// generic clickable > scrollable > cancel is the contract.
pub fn type_weight(kind: ElementKind) -> i32 {
    match kind {
        ElementKind::Navigation => 55,
        ElementKind::ButtonSubmit => 50,
        ElementKind::Fab => 48,
        ElementKind::Button => 40,
        ElementKind::InputComment | ElementKind::InputMessage => 38,
        ElementKind::InputText => 35,
        ElementKind::InputSearch => 30,
        ElementKind::Checkbox | ElementKind::Radio | ElementKind::Switch => 28,
        ElementKind::Clickable => 25,
        ElementKind::InputEmail
        | ElementKind::InputPassword
        | ElementKind::InputName
        | ElementKind::InputPhone => 25,
        ElementKind::Scrollable => 20,
        ElementKind::Webview => 15,
        ElementKind::Focusable => 12,
        ElementKind::ButtonCancel => 10,
        ElementKind::ToolbarCorner => 15,
        ElementKind::GridPoint => 3,
        ElementKind::Other => 5,
    }
}

const FORENSIC_BONUS: i32 = 25;
const SUBMIT_BONUS: i32 = 35;
const TOP_BAR_BONUS: i32 = 12;
const BOTTOM_NAV_BONUS: i32 = 30;
const NAF_BONUS: i32 = 5;
const SHORT_TEXT_BONUS: i32 = 8;

/// Static priority: a pure function of the element and the screen size.
pub fn static_priority(elem: &Element, screen: (i32, i32)) -> i32 {
    let mut priority = type_weight(elem.kind);
    let haystack = elem.haystack();

    if matches_any(&haystack, FORENSIC_KEYWORDS) {
        priority += FORENSIC_BONUS;
    }
    if matches_any(&haystack, SUBMIT_KEYWORDS) {
        priority += SUBMIT_BONUS;
    }

    // Top toolbar band; bottom navigation band.
    if elem.center_y < 200 {
        priority += TOP_BAR_BONUS;
    }
    if screen.1 > 0 && elem.center_y as i64 * 100 > screen.1 as i64 * 85 {
        priority += BOTTOM_NAV_BONUS;
    }

    if elem.naf {
        priority += NAF_BONUS;
    }
    if !elem.text.is_empty() && elem.text.len() < 30 {
        priority += SHORT_TEXT_BONUS;
    }

    priority
}

/// Re-rank a snapshot's elements with session history: success-rate feedback,
/// a penalty for over-tried controls, a bonus for edges known to reach new
/// screens, and a heavy penalty for already-visited elements.
pub fn dynamic_scores(
    elements: &[Element],
    tracker: &ScreenTracker,
    screen_hash: &str,
) -> Vec<(usize, i32)> {
    let mut scored: Vec<(usize, i32)> = elements
        .iter()
        .enumerate()
        .map(|(idx, elem)| {
            let mut score = elem.priority;

            match tracker.element_stats(screen_hash, &elem.signature) {
                Some(stats) => {
                    score += (stats.success_rate() * 15.0) as i32;
                    score -= stats.attempts as i32 * 3;
                }
                None => score += 10, // unexplored bonus
            }

            if tracker.leads_to_new(screen_hash, &elem.signature) {
                score += 25;
            }

            if tracker.is_element_visited(screen_hash, &elem.signature) {
                score -= 50;
            }

            (idx, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
}
