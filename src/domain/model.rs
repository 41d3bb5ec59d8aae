use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,      // nombre lógico, p.ej. "fasterrcnn_resnet50_fpn"
    pub onnx_path: String, // ruta en disco
}

/// Umbral de confianza; solo se informan scores estrictamente mayores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceThreshold(f32);

impl ConfidenceThreshold {
    pub const DEFAULT: f32 = 0.5;

    pub fn new(value: f32) -> DomainResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(DomainError::InvalidInput(format!(
                "threshold debe estar en [0, 1], recibido {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for ConfidenceThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Descripción del proveedor de detecciones cargado, expuesta en `/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub model_type: String,
    pub device: String,
    pub model_path: String,
}
