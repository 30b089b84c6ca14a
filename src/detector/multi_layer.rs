use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::detector::grid::adaptive_grid;
use crate::detector::vision::VisionClient;
use crate::detector::window_dump::parse_window_rects;
use crate::device::channel::DeviceChannel;
use crate::snapshot::element::Element;
use crate::snapshot::parser::parse_hierarchy;

/// How long one detection result stays valid. Several sub-decisions inside a
/// single loop iteration re-read the element list; this keeps them from
/// re-querying the device each time.
pub const CACHE_TTL: Duration = Duration::from_millis(300);
/// Below this count the next acquisition layer is tried.
pub const STAGE_THRESHOLD: usize = 12;
/// Below this count the synthetic grid kicks in unconditionally.
pub const ABSOLUTE_MIN: usize = 3;
/// Cross-source de-duplication radius in pixels, per axis.
pub const MERGE_RADIUS: i32 = 40;

/// Layered element acquisition: hierarchy dump, window-manager rectangles,
/// vision classifier, synthetic grid. Each layer only runs when the previous
/// ones left the list thin, and the final list is sorted by priority.
pub struct MultiLayerDetector {
    pub vision: Option<VisionClient>,
    screenshot_path: PathBuf,
    cache: Option<(Instant, Vec<Element>)>,
}

impl MultiLayerDetector {
    pub fn new(vision: Option<VisionClient>, screenshot_path: PathBuf) -> Self {
        MultiLayerDetector {
            vision,
            screenshot_path,
            cache: None,
        }
    }

    /// Drop the cached result so the next call re-queries the device.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn detect(
        &mut self,
        device: &mut dyn DeviceChannel,
        screen: (i32, i32),
    ) -> Vec<Element> {
        if let Some((at, cached)) = &self.cache {
            if at.elapsed() < CACHE_TTL {
                return cached.clone();
            }
        }

        let mut elements = match device.ui_dump() {
            Ok(xml) => parse_hierarchy(&xml, screen),
            Err(e) => {
                eprintln!("[detector] hierarchy dump failed: {}", e);
                Vec::new()
            }
        };

        if elements.len() < STAGE_THRESHOLD {
            match device.window_dump() {
                Ok(dump) => merge(&mut elements, parse_window_rects(&dump, screen)),
                Err(e) => eprintln!("[detector] window dump failed: {}", e),
            }
        }

        if elements.len() < STAGE_THRESHOLD {
            if let Some(vision) = &self.vision {
                match device
                    .screenshot(&self.screenshot_path)
                    .and_then(|_| vision.detect(&self.screenshot_path))
                {
                    Ok(found) => merge(&mut elements, found),
                    Err(e) => eprintln!("[detector] vision layer failed: {}", e),
                }
            }
        }

        if elements.len() < ABSOLUTE_MIN {
            merge(&mut elements, adaptive_grid(screen.0, screen.1));
        }

        elements.sort_by(|a, b| b.priority.cmp(&a.priority));
        self.cache = Some((Instant::now(), elements.clone()));
        elements
    }
}

/// Positional de-duplication: a candidate is dropped when an existing
/// element's center is within the merge radius on both axes. Signature
/// comparison would miss duplicates here since the sources rarely agree on
/// metadata for the same physical control.
pub fn merge(base: &mut Vec<Element>, extra: Vec<Element>) {
    for cand in extra {
        let dup = base.iter().any(|e| {
            (e.center_x - cand.center_x).abs() <= MERGE_RADIUS
                && (e.center_y - cand.center_y).abs() <= MERGE_RADIUS
        });
        if !dup {
            base.push(cand);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::element::ElementKind;

    fn point(cx: i32, cy: i32) -> Element {
        Element::synthetic(
            ElementKind::Clickable,
            cx,
            cy,
            40,
            40,
            format!("t_{}_{}", cx, cy),
            5,
        )
    }

    #[test]
    fn merge_suppresses_nearby_candidates() {
        let mut base = vec![point(100, 100)];
        merge(&mut base, vec![point(120, 130), point(100, 300)]);
        assert_eq!(base.len(), 2);
        assert_eq!(base[1].center_y, 300);
    }

    #[test]
    fn merge_keeps_candidates_outside_radius() {
        let mut base = vec![point(100, 100)];
        merge(&mut base, vec![point(141, 100)]);
        assert_eq!(base.len(), 2);
    }
}
