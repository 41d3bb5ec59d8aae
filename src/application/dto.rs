use serde::{Deserialize, Serialize};

use crate::domain::report::Finding;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictQuery {
    pub threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub detections: usize,
    /// `data:image/jpeg;base64,...`
    pub image_base64: String,
    pub findings: Vec<Finding>,
    pub caption: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestDetectionResponse {
    pub success: bool,
    pub detected_class: Option<String>,
    pub finding: Option<Finding>,
    pub image_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub device: String,
    pub model_type: String,
    pub model_path: String,
    pub num_classes: usize,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
