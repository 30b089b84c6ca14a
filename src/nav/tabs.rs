use crate::snapshot::element::Element;

const TIER1_MIN_TABS: usize = 3;
const BOTTOM_REGION_RATIO: f64 = 0.18;
const TAB_MIN_WIDTH: i32 = 40;
const TAB_MAX_HEIGHT: i32 = 200;
const TAB_MAX_WIDTH_RATIO: f64 = 0.8;
const CLUSTER_RADIUS: i32 = 80;
const TIER2_MIN_TABS: usize = 2;
const TIER2_MAX_TABS: usize = 8;
const FALLBACK_TABS: usize = 5;
const FALLBACK_Y_OFFSET: i32 = 80;

/// One navigation tab target, session-cached.
#[derive(Debug, Clone)]
pub struct Tab {
    pub x: i32,
    pub y: i32,
    pub label: String,
    pub visited: bool,
}

/// Three-tier bottom-navigation detector. Tabs are cached for the whole
/// session once any tier succeeds; the synthetic tier fires at most once and
/// only if no real detection ever worked.
pub struct NavDetector {
    tabs: Vec<Tab>,
    detected: bool,
    fallback_used: bool,
}

impl NavDetector {
    pub fn new() -> Self {
        NavDetector {
            tabs: Vec::new(),
            detected: false,
            fallback_used: false,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn visited_count(&self) -> usize {
        self.tabs.iter().filter(|t| t.visited).count()
    }

    /// Confirmed only from the policy side, after a screen-hash change
    /// proved the switch actually happened.
    pub fn mark_visited(&mut self, index: usize) {
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.visited = true;
        }
    }

    pub fn next_unvisited(&self) -> Option<(usize, &Tab)> {
        self.tabs.iter().enumerate().find(|(_, t)| !t.visited)
    }

    /// Run detection against the current element list. Re-entrant until a
    /// real tier succeeds; afterwards the cached tabs are kept as-is.
    pub fn update(&mut self, elements: &[Element], screen: (i32, i32)) {
        if self.detected {
            return;
        }

        if let Some(tabs) = tier1_widget_match(elements) {
            self.tabs = tabs;
            self.detected = true;
            return;
        }

        if let Some(tabs) = tier2_bottom_cluster(elements, screen) {
            self.tabs = tabs;
            self.detected = true;
            return;
        }

        if !self.fallback_used {
            self.fallback_used = true;
            self.tabs = tier3_fixed(screen);
        }
    }
}

fn make_tab(e: &Element) -> Tab {
    let label = if !e.text.is_empty() {
        e.text.clone()
    } else if !e.desc.is_empty() {
        e.desc.clone()
    } else {
        e.resource_id.clone()
    };
    Tab {
        x: e.center_x,
        y: e.center_y,
        label,
        visited: false,
    }
}

/// Tier 1: the widget names itself. Classes or resource-ids that mention a
/// tab or bottom-navigation container, taken directly when at least 3 match.
fn tier1_widget_match(elements: &[Element]) -> Option<Vec<Tab>> {
    let mut hits: Vec<&Element> = elements
        .iter()
        .filter(|e| {
            let class = e.class.to_lowercase();
            let rid = e.resource_id.to_lowercase();
            class.contains("bottomnavigation")
                || class.contains("tabwidget")
                || class.contains("tab")
                || rid.contains("tab")
                || rid.contains("bottom_nav")
                || rid.contains("bottomnav")
                || rid.contains("navigation")
        })
        .collect();
    if hits.len() < TIER1_MIN_TABS {
        return None;
    }
    hits.sort_by_key(|e| e.center_x);
    Some(hits.into_iter().map(make_tab).collect())
}

/// Tier 2: geometry. Clickable or focusable elements sitting in the bottom
/// strip with tab-like proportions, clustered by x so icon+label pairs
/// collapse into one tab.
fn tier2_bottom_cluster(elements: &[Element], screen: (i32, i32)) -> Option<Vec<Tab>> {
    let (w, h) = screen;
    let bottom_edge = ((h as f64) * (1.0 - BOTTOM_REGION_RATIO)) as i32;
    let max_width = ((w as f64) * TAB_MAX_WIDTH_RATIO) as i32;

    let mut candidates: Vec<&Element> = elements
        .iter()
        .filter(|e| {
            (e.clickable || e.focusable)
                && e.center_y >= bottom_edge
                && e.width >= TAB_MIN_WIDTH
                && e.width <= max_width
                && e.height <= TAB_MAX_HEIGHT
        })
        .collect();
    candidates.sort_by_key(|e| e.center_x);

    let mut tabs: Vec<Tab> = Vec::new();
    for cand in candidates {
        match tabs.last() {
            Some(last) if (cand.center_x - last.x).abs() <= CLUSTER_RADIUS => {}
            _ => tabs.push(make_tab(cand)),
        }
    }

    if tabs.len() >= TIER2_MIN_TABS {
        tabs.truncate(TIER2_MAX_TABS);
        Some(tabs)
    } else {
        None
    }
}

/// Tier 3: blind guesses at the conventional bottom-bar positions.
fn tier3_fixed(screen: (i32, i32)) -> Vec<Tab> {
    let (w, h) = screen;
    (0..FALLBACK_TABS)
        .map(|i| Tab {
            x: ((w as f64) * (0.1 + 0.2 * i as f64)) as i32,
            y: h - FALLBACK_Y_OFFSET,
            label: format!("fallback_tab_{}", i),
            visited: false,
        })
        .collect()
}
