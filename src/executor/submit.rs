use crate::score::keywords::SUBMIT_BUTTON_PATTERNS;
use crate::snapshot::element::Element;

/// Same-row tolerance for the inline send-icon stage.
const ROW_TOLERANCE: i32 = 100;
/// Right-edge fraction where send icons and app-bar actions live.
const RIGHT_FRACTION: f64 = 0.7;
/// App-bar actions sit above this line.
const TOP_BAR_Y: i32 = 200;

/// Outcome of the submit-discovery cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    /// Tap the element at this index.
    Element(usize),
    /// No candidate on screen; emulate the keyboard send action.
    EnterKey,
}

/// Find the control that commits just-entered text.
///
/// Stages, first hit wins: keyword match (button-classed elements checked
/// before the rest, patterns in priority order), then an inline icon to the
/// right of the input's row, then a top-right app-bar action, then the
/// Enter-key fallback.
pub fn find_submit(elements: &[Element], input: &Element, screen: (i32, i32)) -> SubmitTarget {
    let right_edge = (screen.0 as f64 * RIGHT_FRACTION) as i32;

    // Stage 1: vocabulary. Buttons first so a labelled "Send" button beats
    // a generic clickable carrying the same word.
    let buttons: Vec<usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            e.clickable
                && (e.class.to_lowercase().contains("button")
                    || e.resource_id.to_lowercase().contains("button"))
        })
        .map(|(i, _)| i)
        .collect();
    let rest: Vec<usize> = (0..elements.len())
        .filter(|i| !buttons.contains(i) && elements[*i].clickable)
        .collect();

    for pattern in SUBMIT_BUTTON_PATTERNS {
        for &i in buttons.iter().chain(rest.iter()) {
            if elements[i].haystack().contains(pattern) {
                return SubmitTarget::Element(i);
            }
        }
    }

    // Stage 2: inline send icon, same row as the input, right side of
    // the screen, rightmost wins.
    let inline = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            e.clickable
                && (e.center_y - input.center_y).abs() < ROW_TOLERANCE
                && e.center_x > right_edge
        })
        .max_by_key(|(_, e)| e.center_x);
    if let Some((i, _)) = inline {
        return SubmitTarget::Element(i);
    }

    // Stage 3: top-right app-bar action (compose screens).
    let top_right = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.clickable && e.center_y < TOP_BAR_Y && e.center_x > right_edge)
        .max_by_key(|(_, e)| e.center_x);
    if let Some((i, _)) = top_right {
        return SubmitTarget::Element(i);
    }

    SubmitTarget::EnterKey
}
