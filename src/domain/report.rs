use serde::{Deserialize, Serialize};

use super::classes::class_name;
use super::detection::{Detection, DetectionSet};

pub const NO_FINDINGS_CAPTION: &str =
    "No fractures detected in the bone X-ray. The bones appear to be intact with no visible abnormalities.";

pub const DISCLAIMER: &str =
    "Please consult with a medical professional for proper diagnosis and treatment.";

/// Una detección tal como se entrega al cliente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: String,
    /// Porcentaje redondeado a un decimal (0.8734 -> 87.3).
    pub confidence: f64,
    #[serde(rename = "box")]
    pub bbox: [f32; 4],
}

impl From<&Detection> for Finding {
    fn from(det: &Detection) -> Self {
        Self {
            kind: class_name(det.class_id).into_owned(),
            confidence: confidence_percent(det.confidence),
            bbox: det.bbox.to_array(),
        }
    }
}

pub fn confidence_percent(confidence: f32) -> f64 {
    (confidence as f64 * 1000.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingReport {
    pub findings: Vec<Finding>,
    pub caption: String,
}

impl FindingReport {
    pub fn from_detections(detections: &DetectionSet) -> Self {
        let findings: Vec<Finding> = detections.iter().map(Finding::from).collect();
        let caption = caption_for(&findings);
        Self { findings, caption }
    }
}

/// Los porcentajes del caption salen de los findings ya redondeados, así ambos coinciden.
fn caption_for(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return NO_FINDINGS_CAPTION.to_string();
    }
    let listed = findings
        .iter()
        .map(|f| format!("{} ({:.1}% confidence)", f.kind, f.confidence))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Detected {} potential fracture(s): {}. {}",
        findings.len(),
        listed,
        DISCLAIMER
    )
}
