use crate::snapshot::element::{Element, ElementKind};

const TOOLBAR_Y: i32 = 100;
const TOOLBAR_INSET: i32 = 60;
const NAV_POINTS: i32 = 5;
const NAV_Y_OFFSET: i32 = 80;
const GRID_COLS: i32 = 3;
const GRID_ROWS: i32 = 5;
const FAB_X_OFFSET: i32 = 80;
const FAB_Y_OFFSET: i32 = 200;

const TOOLBAR_PRIORITY: i32 = 15;
const NAV_PRIORITY: i32 = 18;
const GRID_PRIORITY: i32 = 3;
const FAB_PRIORITY: i32 = 20;

/// Deterministic synthetic tap targets derived from the screen size alone.
/// Last-resort layer: when every real detection source came back empty the
/// policy still needs something to try, so we offer the spots where Android
/// apps conventionally put their chrome.
pub fn adaptive_grid(width: i32, height: i32) -> Vec<Element> {
    let mut out = Vec::new();

    // Toolbar corners: menu and overflow positions.
    for x in [TOOLBAR_INSET, width - TOOLBAR_INSET] {
        out.push(Element::synthetic(
            ElementKind::ToolbarCorner,
            x,
            TOOLBAR_Y,
            40,
            40,
            format!("grid_toolbar_{}_{}", x, TOOLBAR_Y),
            TOOLBAR_PRIORITY,
        ));
    }

    // Evenly spaced bottom-nav candidates.
    let nav_y = height - NAV_Y_OFFSET;
    for i in 1..=NAV_POINTS {
        let x = width * i / (NAV_POINTS + 1);
        out.push(Element::synthetic(
            ElementKind::Navigation,
            x,
            nav_y,
            60,
            60,
            format!("grid_nav_{}_{}", x, nav_y),
            NAV_PRIORITY,
        ));
    }

    // Coarse interior grid for content areas.
    for row in 1..=GRID_ROWS {
        let y = height * row / (GRID_ROWS + 1);
        for col in 1..=GRID_COLS {
            let x = width * col / (GRID_COLS + 1);
            out.push(Element::synthetic(
                ElementKind::GridPoint,
                x,
                y,
                40,
                40,
                format!("grid_point_{}_{}", x, y),
                GRID_PRIORITY,
            ));
        }
    }

    // Conventional floating-action-button position.
    let fab_x = width - FAB_X_OFFSET;
    let fab_y = height - FAB_Y_OFFSET;
    out.push(Element::synthetic(
        ElementKind::Fab,
        fab_x,
        fab_y,
        56,
        56,
        format!("grid_fab_{}_{}", fab_x, fab_y),
        FAB_PRIORITY,
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_always_contains_a_fab_near_bottom_right() {
        let grid = adaptive_grid(1080, 2340);
        let fab = grid
            .iter()
            .find(|e| e.kind == ElementKind::Fab)
            .expect("grid must include a fab point");
        assert!(fab.center_x > 1080 * 3 / 4);
        assert!(fab.center_y > 2340 * 3 / 4);
    }

    #[test]
    fn grid_nav_points_sit_on_a_bottom_row() {
        let grid = adaptive_grid(1000, 2000);
        let navs: Vec<_> = grid
            .iter()
            .filter(|e| e.kind == ElementKind::Navigation)
            .collect();
        assert_eq!(navs.len(), 5);
        assert!(navs.iter().all(|e| e.center_y == 2000 - 80));
    }
}
