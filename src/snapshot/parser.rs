use std::collections::HashMap;

use crate::score::priority::static_priority;
use crate::snapshot::classify::{RawNode, infer_kind};
use crate::snapshot::element::{Bounds, Element, ElementKind};

/// Widget class fragments that are always worth keeping even without a
/// capability flag set.
const INTERACTIVE_CLASSES: &[&str] = &[
    "EditText", "AutoCompleteTextView", "SearchView",
    "Button", "ImageButton", "FloatingActionButton",
    "CheckBox", "RadioButton", "Switch", "ToggleButton",
    "Spinner", "SeekBar", "RatingBar",
    "Tab", "BottomNavigationItemView",
    "RecyclerView", "ListView", "GridView", "ScrollView",
    "WebView", "VideoView",
];

/// Container area window (px²): big enough to be a tappable card, small
/// enough not to be the whole screen.
const CONTAINER_MIN_AREA: i64 = 3_000;
const CONTAINER_MAX_AREA: i64 = 300_000;

/// Parse a UI hierarchy dump into a flat, ordered list of actionable
/// elements. Malformed nodes are dropped, never surfaced as errors.
pub fn parse_hierarchy(xml: &str, screen: (i32, i32)) -> Vec<Element> {
    let mut elements = Vec::new();

    for attrs in node_tags(xml) {
        if !is_actionable(&attrs) {
            continue;
        }
        if let Some(elem) = build_element(&attrs, screen) {
            elements.push(elem);
        }
    }

    elements
}

/// Extract the attribute map of every `<node ...>` tag in document order.
fn node_tags(xml: &str) -> Vec<HashMap<String, String>> {
    let mut out = Vec::new();
    let mut rest = xml;

    while let Some(start) = rest.find("<node") {
        let after = &rest[start + 5..];
        match after.find('>') {
            Some(end) => {
                let attr_str = after[..end].trim_end_matches('/');
                out.push(parse_attributes(attr_str));
                rest = &after[end + 1..];
            }
            None => break,
        }
    }

    out
}

/// Parse `name="value"` pairs, decoding standard markup entities.
fn parse_attributes(attr_str: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let bytes = attr_str.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        // Skip to the start of a name
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len() && bytes[i] != b'=' && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            break;
        }
        let name = &attr_str[name_start..i];
        i += 1;
        if i >= bytes.len() || bytes[i] != b'"' {
            break;
        }
        i += 1;
        let value_start = i;
        while i < bytes.len() && bytes[i] != b'"' {
            i += 1;
        }
        if i > bytes.len() {
            break;
        }
        let value = &attr_str[value_start..i.min(attr_str.len())];
        attrs.insert(name.to_string(), decode_entities(value));
        i += 1;
    }

    attrs
}

/// Decode the standard markup entities a dump may carry.
pub fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#10;", "\n")
        .replace("&#13;", "\r")
        .replace("&amp;", "&")
}

fn flag(attrs: &HashMap<String, String>, key: &str) -> bool {
    attrs.get(key).map(|v| v == "true").unwrap_or(false)
}

fn get<'a>(attrs: &'a HashMap<String, String>, key: &str) -> &'a str {
    attrs.get(key).map(String::as_str).unwrap_or("")
}

/// A node is retained when it is interactable, names an interactive widget
/// class, carries the NAF marker, or is a mid-sized container that could be
/// a tappable card.
fn is_actionable(attrs: &HashMap<String, String>) -> bool {
    if flag(attrs, "clickable")
        || flag(attrs, "checkable")
        || flag(attrs, "scrollable")
        || flag(attrs, "long-clickable")
        || flag(attrs, "focusable")
    {
        return true;
    }

    let class = get(attrs, "class");
    if INTERACTIVE_CLASSES.iter().any(|c| class.contains(c)) {
        return true;
    }

    if flag(attrs, "NAF") {
        return true;
    }

    if class.contains("ViewGroup") || class.contains("Layout") {
        if let Some(bounds) = parse_bounds(get(attrs, "bounds")) {
            let area = bounds.area();
            if area > CONTAINER_MIN_AREA && area < CONTAINER_MAX_AREA {
                return true;
            }
        }
    }

    false
}

/// Parse `[x1,y1][x2,y2]`. Returns None on any malformation.
pub fn parse_bounds(raw: &str) -> Option<Bounds> {
    let raw = raw.strip_prefix('[')?;
    let (first, rest) = raw.split_once("][")?;
    let second = rest.strip_suffix(']')?;

    let (x1, y1) = first.split_once(',')?;
    let (x2, y2) = second.split_once(',')?;

    Some(Bounds {
        x1: x1.trim().parse().ok()?,
        y1: y1.trim().parse().ok()?,
        x2: x2.trim().parse().ok()?,
        y2: y2.trim().parse().ok()?,
    })
}

/// Bounds fail closed: degenerate geometry drops the node.
fn build_element(attrs: &HashMap<String, String>, screen: (i32, i32)) -> Option<Element> {
    let bounds = parse_bounds(get(attrs, "bounds"))?;

    if bounds.x2 <= bounds.x1 || bounds.y2 <= bounds.y1 {
        return None;
    }
    if bounds.x1 < 0 || bounds.y1 < 0 {
        return None;
    }

    let width = bounds.width();
    let height = bounds.height();
    if width < 10 || height < 10 {
        return None;
    }

    let (center_x, center_y) = bounds.center();

    let class = get(attrs, "class").to_string();
    let text = get(attrs, "text").trim().to_string();
    let desc = get(attrs, "content-desc").replace('\n', " ").trim().to_string();
    let resource_id = get(attrs, "resource-id").to_string();

    let clickable = flag(attrs, "clickable");
    let focusable = flag(attrs, "focusable");
    let scrollable = flag(attrs, "scrollable");
    let naf = flag(attrs, "NAF");

    let kind = infer_kind(
        &RawNode {
            class: &class,
            text: &text,
            desc: &desc,
            resource_id: &resource_id,
            clickable,
            focusable,
            scrollable,
            center_y,
            height,
        },
        screen.1,
    );

    let signature = Element::make_signature(kind, center_x, center_y, &resource_id);

    let mut elem = Element {
        bounds,
        center_x,
        center_y,
        width,
        height,
        class,
        text,
        desc,
        resource_id,
        package: get(attrs, "package").to_string(),
        clickable,
        checkable: flag(attrs, "checkable"),
        scrollable,
        long_clickable: flag(attrs, "long-clickable"),
        focusable,
        enabled: get(attrs, "enabled") != "false",
        selected: flag(attrs, "selected"),
        checked: flag(attrs, "checked"),
        naf,
        kind,
        signature,
        priority: 0,
    };
    elem.priority = static_priority(&elem, screen);

    Some(elem)
}
