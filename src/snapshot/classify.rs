use crate::score::keywords::{INPUT_HINT_KEYWORDS, SUBMIT_KEYWORDS, matches_any};
use crate::snapshot::element::ElementKind;

/// Everything the classifier looks at, before an `Element` exists.
pub struct RawNode<'a> {
    pub class: &'a str,
    pub text: &'a str,
    pub desc: &'a str,
    pub resource_id: &'a str,
    pub clickable: bool,
    pub focusable: bool,
    pub scrollable: bool,
    pub center_y: i32,
    pub height: i32,
}

/// Infer the semantic kind of a node. First match wins; the order here is
/// part of the classifier contract.
pub fn infer_kind(node: &RawNode<'_>, screen_height: i32) -> ElementKind {
    let class = node.class.to_lowercase();
    let combined = format!("{} {} {}", node.text, node.desc, node.resource_id).to_lowercase();

    // Edit-field classes get an input subtype from their keywords.
    if class.contains("edittext") || class.contains("autocomplete") {
        if combined.contains("search") {
            return ElementKind::InputSearch;
        }
        if combined.contains("email") {
            return ElementKind::InputEmail;
        }
        if combined.contains("password") {
            return ElementKind::InputPassword;
        }
        if combined.contains("phone") {
            return ElementKind::InputPhone;
        }
        if combined.contains("message") {
            return ElementKind::InputMessage;
        }
        if combined.contains("comment") {
            return ElementKind::InputComment;
        }
        if combined.contains("name") {
            return ElementKind::InputName;
        }
        return ElementKind::InputText;
    }

    if class.contains("button") {
        if class.contains("floatingactionbutton") {
            return ElementKind::Fab;
        }
        if matches_any(&combined, &["send", "submit", "post", "save", "confirm"]) {
            return ElementKind::ButtonSubmit;
        }
        if matches_any(&combined, &["cancel", "close"]) {
            return ElementKind::ButtonCancel;
        }
        return ElementKind::Button;
    }

    let rid = node.resource_id.to_lowercase();
    if rid.contains("tab")
        || rid.contains("nav")
        || rid.contains("bottom")
        || class.contains("bottomnavigation")
    {
        return ElementKind::Navigation;
    }

    if class.contains("checkbox") {
        return ElementKind::Checkbox;
    }
    if class.contains("radio") {
        return ElementKind::Radio;
    }
    if class.contains("switch") || class.contains("toggle") {
        return ElementKind::Switch;
    }

    if node.scrollable {
        return ElementKind::Scrollable;
    }

    if class.contains("webview") {
        return ElementKind::Webview;
    }

    // Custom inputs: focusable but not clickable. Keyword hints first, then
    // a plausible input box in the middle vertical band of the screen.
    if node.focusable && !node.clickable {
        if matches_any(&combined, INPUT_HINT_KEYWORDS) || matches_any(&combined, SUBMIT_KEYWORDS) {
            return ElementKind::InputComment;
        }

        let h = if screen_height > 0 { screen_height } else { 1920 };
        if node.center_y > h * 3 / 10
            && node.center_y < h * 9 / 10
            && node.height > 40
            && node.height < h * 2 / 5
        {
            return ElementKind::InputText;
        }
    }

    if node.clickable {
        return ElementKind::Clickable;
    }
    if node.focusable {
        return ElementKind::Focusable;
    }

    ElementKind::Other
}
