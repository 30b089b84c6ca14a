use std::path::Path;

use serde::Deserialize;

use crate::error::ExploreError;
use crate::snapshot::element::{Element, ElementKind};

const DEFAULT_PRIORITY: i32 = 10;

/// One detection from the external vision classifier.
#[derive(Debug, Deserialize)]
pub struct Detection {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Client for the optional screenshot-classifier service: PNG in, JSON
/// detections out. Any failure is reported as a typed error; the detector
/// treats that as "this layer produced nothing".
pub struct VisionClient {
    pub endpoint: String,
    client: reqwest::blocking::Client,
}

impl VisionClient {
    pub fn new(endpoint: &str) -> Self {
        VisionClient {
            endpoint: endpoint.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn detect(&self, screenshot: &Path) -> Result<Vec<Element>, ExploreError> {
        let bytes = std::fs::read(screenshot)
            .map_err(|e| ExploreError::Vision(format!("read {}: {}", screenshot.display(), e)))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "image/png")
            .body(bytes)
            .send()
            .map_err(|e| ExploreError::Vision(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ExploreError::Vision(format!(
                "classifier returned {}",
                response.status()
            )));
        }

        let parsed: VisionResponse = response
            .json()
            .map_err(|e| ExploreError::Vision(format!("bad response body: {}", e)))?;

        Ok(parsed.detections.iter().map(to_element).collect())
    }
}

/// Map a raw detection into the shared element shape. Signatures are
/// namespaced with `cv_` so a vision point never collides with a UI-tree
/// signature for the same control.
pub fn to_element(det: &Detection) -> Element {
    let kind = match det.kind.as_str() {
        "button" => ElementKind::Button,
        "fab" => ElementKind::Fab,
        "input" | "edittext" | "text_field" => ElementKind::InputText,
        "tab" | "navigation" => ElementKind::Navigation,
        "checkbox" => ElementKind::Checkbox,
        _ => ElementKind::Clickable,
    };
    let signature = format!("cv_{}_{}_{}", det.kind, det.x, det.y);
    let mut elem = Element::synthetic(
        kind,
        det.x,
        det.y,
        det.width.max(1),
        det.height.max(1),
        signature,
        det.priority.unwrap_or(DEFAULT_PRIORITY),
    );
    elem.text = det.text.clone();
    elem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_maps_to_namespaced_element() {
        let det = Detection {
            kind: "button".to_string(),
            x: 540,
            y: 1800,
            width: 120,
            height: 48,
            text: "Send".to_string(),
            priority: None,
        };
        let elem = to_element(&det);
        assert_eq!(elem.kind, ElementKind::Button);
        assert_eq!(elem.signature, "cv_button_540_1800");
        assert_eq!(elem.priority, 10);
        assert_eq!(elem.text, "Send");
    }
}
