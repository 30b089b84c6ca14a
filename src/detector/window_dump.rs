use crate::snapshot::element::{Element, ElementKind};

const WINDOW_PRIORITY: i32 = 5;
const MIN_SIDE: i32 = 10;

/// Coarse secondary element source: scan a window-manager dump for
/// `{left,top-right,bottom}` frame rectangles and turn each plausible one
/// into a generic clickable target. No semantic attributes survive this
/// path, so everything comes out as a low-priority `clickable`.
pub fn parse_window_rects(dump: &str, screen: (i32, i32)) -> Vec<Element> {
    let (screen_w, screen_h) = screen;
    let full_area = screen_w as i64 * screen_h as i64;
    let mut out: Vec<Element> = Vec::new();

    let mut i = 0;
    while let Some(open) = dump[i..].find('{') {
        let start = i + open + 1;
        let Some(close) = dump[start..].find('}') else {
            break;
        };
        let body = &dump[start..start + close];
        i = start + close + 1;

        if let Some(rect) = parse_rect(body) {
            let (x1, y1, x2, y2) = rect;
            let w = x2 - x1;
            let h = y2 - y1;
            if w < MIN_SIDE || h < MIN_SIDE || x1 < 0 || y1 < 0 {
                continue;
            }
            // Full-screen windows are backdrops, not targets.
            if full_area > 0 && (w as i64 * h as i64) * 10 >= full_area * 9 {
                continue;
            }
            let cx = (x1 + x2) / 2;
            let cy = (y1 + y2) / 2;
            if out.iter().any(|e| e.center_x == cx && e.center_y == cy) {
                continue;
            }
            let signature = Element::make_signature(ElementKind::Clickable, cx, cy, "");
            let mut elem =
                Element::synthetic(ElementKind::Clickable, cx, cy, w, h, signature, WINDOW_PRIORITY);
            elem.bounds.x1 = x1;
            elem.bounds.y1 = y1;
            elem.bounds.x2 = x2;
            elem.bounds.y2 = y2;
            out.push(elem);
        }
    }

    out
}

/// `"l,t-r,b"` with all four fields as non-negative integers.
fn parse_rect(body: &str) -> Option<(i32, i32, i32, i32)> {
    let (lt, rb) = body.split_once('-')?;
    let (l, t) = lt.split_once(',')?;
    let (r, b) = rb.split_once(',')?;
    let x1 = l.trim().parse().ok()?;
    let y1 = t.trim().parse().ok()?;
    let x2 = r.trim().parse().ok()?;
    let y2 = b.trim().parse().ok()?;
    Some((x1, y1, x2, y2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_frame_rects_and_skips_fullscreen() {
        let dump = "Window #3: mFrame={0,0-1080,2340} touchable={100,200-300,260}";
        let elems = parse_window_rects(dump, (1080, 2340));
        assert_eq!(elems.len(), 1);
        assert_eq!(elems[0].center_x, 200);
        assert_eq!(elems[0].center_y, 230);
        assert_eq!(elems[0].kind, ElementKind::Clickable);
        assert_eq!(elems[0].priority, 5);
    }

    #[test]
    fn ignores_garbage_braces() {
        let dump = "state={RESUMED} frame={12,abc-40,50} tiny={0,0-4,4}";
        assert!(parse_window_rects(dump, (1080, 2340)).is_empty());
    }
}
