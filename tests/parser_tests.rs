use droid_explorer::snapshot::element::{Element, ElementKind};
use droid_explorer::snapshot::parser::{decode_entities, parse_bounds, parse_hierarchy};

const SCREEN: (i32, i32) = (1080, 2340);

fn dump(nodes: &str) -> String {
    format!(
        "<?xml version='1.0' encoding='UTF-8'?><hierarchy rotation=\"0\">{}</hierarchy>",
        nodes
    )
}

// =========================================================================
// Hierarchy parsing
// =========================================================================

#[test]
fn edit_text_node_becomes_a_text_input_element() {
    let xml = dump(
        r#"<node class="android.widget.EditText" text="" content-desc="" resource-id="com.app:id/note" bounds="[100,200][300,260]" clickable="true" focusable="true" />"#,
    );
    let elements = parse_hierarchy(&xml, SCREEN);

    assert_eq!(elements.len(), 1, "One actionable node, one element");
    let e = &elements[0];
    assert_eq!(e.kind, ElementKind::InputText, "EditText without hints is a plain text input");
    assert_eq!((e.center_x, e.center_y), (200, 230), "Center of [100,200][300,260]");
    assert_eq!((e.width, e.height), (200, 60));
    assert!(e.kind.is_input(), "Text inputs report as inputs");
    assert!(e.priority > 0, "Every retained element gets a positive priority");
}

#[test]
fn input_subtype_follows_resource_id_hints() {
    let xml = dump(concat!(
        r#"<node class="android.widget.EditText" text="" content-desc="Search" resource-id="com.app:id/search_src" bounds="[0,100][900,180]" clickable="true" />"#,
        r#"<node class="android.widget.EditText" text="" content-desc="" resource-id="com.app:id/password" bounds="[0,300][900,380]" clickable="true" />"#,
    ));
    let elements = parse_hierarchy(&xml, SCREEN);

    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].kind, ElementKind::InputSearch);
    assert_eq!(elements[1].kind, ElementKind::InputPassword);
}

#[test]
fn non_interactive_decoration_is_dropped() {
    let xml = dump(concat!(
        r#"<node class="android.widget.TextView" text="Just a label" bounds="[0,0][1080,60]" clickable="false" />"#,
        r#"<node class="android.widget.Button" text="OK" bounds="[400,500][680,600]" clickable="true" />"#,
    ));
    let elements = parse_hierarchy(&xml, SCREEN);

    assert_eq!(elements.len(), 1, "Plain TextView is decoration, not an element");
    assert_eq!(elements[0].text, "OK");
}

#[test]
fn degenerate_and_tiny_bounds_are_rejected() {
    let xml = dump(concat!(
        r#"<node class="android.widget.Button" text="zero" bounds="[50,50][50,50]" clickable="true" />"#,
        r#"<node class="android.widget.Button" text="thin" bounds="[0,0][1080,5]" clickable="true" />"#,
        r#"<node class="android.widget.Button" text="offscreen" bounds="[-20,100][200,200]" clickable="true" />"#,
        r#"<node class="android.widget.Button" text="garbled" bounds="[a,b][c,d]" clickable="true" />"#,
    ));
    assert!(
        parse_hierarchy(&xml, SCREEN).is_empty(),
        "Degenerate geometry never produces an element"
    );
}

#[test]
fn entities_in_text_are_decoded() {
    let xml = dump(
        r#"<node class="android.widget.Button" text="Save &amp; Close" bounds="[0,0][200,100]" clickable="true" />"#,
    );
    let elements = parse_hierarchy(&xml, SCREEN);
    assert_eq!(elements[0].text, "Save & Close");

    assert_eq!(decode_entities("a &lt;b&gt; &quot;c&quot;"), "a <b> \"c\"");
}

#[test]
fn parse_bounds_handles_the_standard_format() {
    let b = parse_bounds("[100,200][300,260]").unwrap();
    assert_eq!((b.x1, b.y1, b.x2, b.y2), (100, 200, 300, 260));
    assert!(parse_bounds("").is_none());
    assert!(parse_bounds("[1,2][3").is_none());
}

// =========================================================================
// Signatures
// =========================================================================

#[test]
fn signature_is_stable_under_small_jitter() {
    let a = Element::make_signature(ElementKind::Button, 200, 230, "com.app:id/ok");
    let b = Element::make_signature(ElementKind::Button, 205, 228, "com.app:id/ok");
    assert_eq!(a, b, "A few pixels of jitter maps to the same signature bucket");
}

#[test]
fn signature_separates_kind_position_and_id() {
    let base = Element::make_signature(ElementKind::Button, 200, 230, "com.app:id/ok");
    assert_ne!(
        base,
        Element::make_signature(ElementKind::Checkbox, 200, 230, "com.app:id/ok"),
        "Kind is part of the signature"
    );
    assert_ne!(
        base,
        Element::make_signature(ElementKind::Button, 500, 230, "com.app:id/ok"),
        "Position is part of the signature"
    );
    assert_ne!(
        base,
        Element::make_signature(ElementKind::Button, 200, 230, "com.app:id/cancel"),
        "Resource id is part of the signature"
    );
    assert!(
        Element::make_signature(ElementKind::Button, 200, 230, "").contains("noid"),
        "Missing resource id gets the noid placeholder"
    );
}
