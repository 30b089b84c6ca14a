use std::path::PathBuf;

use droid_explorer::detector::grid::adaptive_grid;
use droid_explorer::detector::multi_layer::{ABSOLUTE_MIN, MultiLayerDetector, STAGE_THRESHOLD};
use droid_explorer::detector::window_dump::parse_window_rects;
use droid_explorer::device::scripted::ScriptedDevice;
use droid_explorer::snapshot::element::ElementKind;

const SCREEN: (i32, i32) = (1080, 2340);

fn detector() -> MultiLayerDetector {
    MultiLayerDetector::new(None, PathBuf::from("/tmp/unused_screen.png"))
}

fn rich_dump(buttons: usize) -> String {
    let mut nodes = String::new();
    for i in 0..buttons {
        nodes.push_str(&format!(
            r#"<node class="android.widget.Button" text="b{i}" bounds="[{x1},{y1}][{x2},{y2}]" clickable="true" />"#,
            x1 = 40,
            y1 = 100 + i as i32 * 120,
            x2 = 400,
            y2 = 180 + i as i32 * 120,
        ));
    }
    format!("<hierarchy>{}</hierarchy>", nodes)
}

// =========================================================================
// Layered acquisition
// =========================================================================

#[test]
fn rich_hierarchy_never_reaches_the_lower_layers() {
    let mut device = ScriptedDevice::new(SCREEN);
    device.push_dump(rich_dump(STAGE_THRESHOLD + 2));

    let elements = detector().detect(&mut device, SCREEN);
    assert_eq!(elements.len(), STAGE_THRESHOLD + 2);
    assert!(
        elements.iter().all(|e| e.kind == ElementKind::Button),
        "No synthetic elements mixed in when the hierarchy is rich"
    );
}

#[test]
fn thin_hierarchy_is_padded_from_the_window_dump() {
    let mut device = ScriptedDevice::new(SCREEN);
    device.push_dump(rich_dump(2));
    device
        .window_dumps
        .push_back("Window #7: mFrame=[0,1900][1080,2100] {0,1900-1080,2100}".to_string());

    let elements = detector().detect(&mut device, SCREEN);
    assert!(
        elements.iter().any(|e| e.center_y == 2000),
        "Window-manager rectangle should appear as an element"
    );
}

#[test]
fn empty_screen_falls_back_to_the_synthetic_grid() {
    let mut device = ScriptedDevice::new(SCREEN);
    device.push_dump("<hierarchy></hierarchy>");
    device.window_dumps.push_back(String::new());

    let elements = detector().detect(&mut device, SCREEN);
    assert!(
        elements.len() >= ABSOLUTE_MIN,
        "Grid fallback must leave something to tap"
    );
    assert!(
        elements.iter().any(|e| e.kind == ElementKind::Fab
            && e.center_x > SCREEN.0 * 3 / 4
            && e.center_y > SCREEN.1 * 3 / 4),
        "Grid includes a FAB probe near the bottom-right corner"
    );
}

#[test]
fn results_are_sorted_by_priority_descending() {
    let mut device = ScriptedDevice::new(SCREEN);
    device.push_dump("<hierarchy></hierarchy>");
    device.window_dumps.push_back(String::new());

    let elements = detector().detect(&mut device, SCREEN);
    assert!(
        elements.windows(2).all(|w| w[0].priority >= w[1].priority),
        "Detector output is ranked"
    );
}

#[test]
fn cache_serves_repeat_calls_until_invalidated() {
    let mut device = ScriptedDevice::new(SCREEN);
    device.push_dump(rich_dump(4));
    device.push_dump(rich_dump(1));
    device.window_dumps.push_back(String::new());

    let mut det = detector();
    let first = det.detect(&mut device, SCREEN);
    let second = det.detect(&mut device, SCREEN);
    assert_eq!(
        first.len(),
        second.len(),
        "Within the TTL the second call must not consume another dump"
    );

    det.invalidate();
    let third = det.detect(&mut device, SCREEN);
    assert_ne!(first.len(), third.len(), "Invalidation forces a fresh acquisition");
}

// =========================================================================
// Window-dump rectangles
// =========================================================================

#[test]
fn window_rects_skip_fullscreen_and_degenerate_entries() {
    let dump = concat!(
        "mFrame {0,0-1080,2340}\n",      // whole screen
        "decor {5,5-8,8}\n",             // too small
        "toast {-10,100-200,200}\n",     // negative origin
        "sheet {100,1800-980,2200}\n",   // keeper
    );
    let rects = parse_window_rects(dump, SCREEN);
    assert_eq!(rects.len(), 1, "Only the plausible mid-size rect survives");
    assert_eq!(rects[0].center_x, 540);
}

// =========================================================================
// Synthetic grid
// =========================================================================

#[test]
fn grid_covers_toolbar_nav_row_and_interior() {
    let grid = adaptive_grid(SCREEN.0, SCREEN.1);

    let nav_row: Vec<_> = grid
        .iter()
        .filter(|e| e.signature.starts_with("grid_nav_"))
        .collect();
    assert_eq!(nav_row.len(), 5, "Five probe points along the nav bar");
    assert!(nav_row.iter().all(|e| e.center_y == SCREEN.1 - 80));

    assert!(grid.iter().any(|e| e.signature.starts_with("grid_toolbar_") && e.center_y == 100));
    assert!(grid.iter().any(|e| e.signature.starts_with("grid_point_")));
}
