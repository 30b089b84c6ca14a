use serde::Serialize;

/// Pixel bounding box, `[x1,y1][x2,y2]` in the hierarchy dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Bounds {
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }
}

/// Semantic type inferred for an element at parse time. Closed set;
/// the relative priority ordering between these is a contract the
/// policy relies on to escape dead ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Navigation,
    ButtonSubmit,
    Fab,
    Button,
    ButtonCancel,
    InputComment,
    InputMessage,
    InputText,
    InputSearch,
    InputEmail,
    InputPassword,
    InputName,
    InputPhone,
    Checkbox,
    Radio,
    Switch,
    Clickable,
    Scrollable,
    Webview,
    Focusable,
    ToolbarCorner,
    GridPoint,
    Other,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Navigation => "navigation",
            ElementKind::ButtonSubmit => "button_submit",
            ElementKind::Fab => "fab",
            ElementKind::Button => "button",
            ElementKind::ButtonCancel => "button_cancel",
            ElementKind::InputComment => "input_comment",
            ElementKind::InputMessage => "input_message",
            ElementKind::InputText => "input_text",
            ElementKind::InputSearch => "input_search",
            ElementKind::InputEmail => "input_email",
            ElementKind::InputPassword => "input_password",
            ElementKind::InputName => "input_name",
            ElementKind::InputPhone => "input_phone",
            ElementKind::Checkbox => "checkbox",
            ElementKind::Radio => "radio",
            ElementKind::Switch => "switch",
            ElementKind::Clickable => "clickable",
            ElementKind::Scrollable => "scrollable",
            ElementKind::Webview => "webview",
            ElementKind::Focusable => "focusable",
            ElementKind::ToolbarCorner => "toolbar_corner",
            ElementKind::GridPoint => "grid_point",
            ElementKind::Other => "other",
        }
    }

    /// True for every `input_*` kind.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            ElementKind::InputComment
                | ElementKind::InputMessage
                | ElementKind::InputText
                | ElementKind::InputSearch
                | ElementKind::InputEmail
                | ElementKind::InputPassword
                | ElementKind::InputName
                | ElementKind::InputPhone
        )
    }
}

/// One interactive or structurally significant UI node.
///
/// Constructed fresh on every snapshot and never mutated afterwards; the
/// short-lived detector cache is the only thing that keeps one alive past
/// its iteration.
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub bounds: Bounds,
    pub center_x: i32,
    pub center_y: i32,
    pub width: i32,
    pub height: i32,

    pub class: String,
    pub text: String,
    pub desc: String,
    pub resource_id: String,
    pub package: String,

    pub clickable: bool,
    pub checkable: bool,
    pub scrollable: bool,
    pub long_clickable: bool,
    pub focusable: bool,
    pub enabled: bool,
    pub selected: bool,
    pub checked: bool,
    /// "Not accessibility friendly" marker from the dump.
    pub naf: bool,

    pub kind: ElementKind,
    pub signature: String,
    pub priority: i32,
}

impl Element {
    /// Combined searchable text: label, description and resource id,
    /// lowercased. Every keyword heuristic matches against this.
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.text, self.desc, self.resource_id).to_lowercase()
    }

    /// Stable identity string, tolerant of small layout jitter: the 30px
    /// position bucket absorbs sub-pixel re-render noise while the resource
    /// id keeps distinct controls at the same spot apart.
    pub fn make_signature(kind: ElementKind, center_x: i32, center_y: i32, resource_id: &str) -> String {
        let rid = if resource_id.is_empty() { "noid" } else { resource_id };
        format!("{}_{}_{}_{}", kind.as_str(), center_x / 30, center_y / 30, rid)
    }

    /// Synthetic element used by the grid fallback and vision detections:
    /// only a center point, a kind, a caller-chosen signature and priority.
    pub fn synthetic(
        kind: ElementKind,
        center_x: i32,
        center_y: i32,
        width: i32,
        height: i32,
        signature: String,
        priority: i32,
    ) -> Element {
        let half_w = width.max(1) / 2;
        let half_h = height.max(1) / 2;
        Element {
            bounds: Bounds {
                x1: (center_x - half_w).max(0),
                y1: (center_y - half_h).max(0),
                x2: center_x + half_w,
                y2: center_y + half_h,
            },
            center_x,
            center_y,
            width: width.max(1),
            height: height.max(1),
            class: String::new(),
            text: String::new(),
            desc: String::new(),
            resource_id: String::new(),
            package: String::new(),
            clickable: true,
            checkable: false,
            scrollable: false,
            long_clickable: false,
            focusable: false,
            enabled: true,
            selected: false,
            checked: false,
            naf: false,
            kind,
            signature,
            priority,
        }
    }
}
