use std::path::PathBuf;

use clap::Parser;

/// Configuración de arranque. Cada flag admite también su variable de entorno
/// (se lee un `.env` del directorio de trabajo).
#[derive(Debug, Clone, Parser)]
#[command(name = "bone-fracture-api", version, about = "Bone fracture detection API")]
pub struct AppConfig {
    #[arg(long, env = "BONES_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "BONES_PORT", default_value_t = 8503)]
    pub port: u16,

    /// Faster R-CNN exportado a ONNX.
    #[arg(long, env = "BONES_MODEL_PATH", default_value = "xray_models/bones/resnet.onnx")]
    pub model_path: String,

    /// Fuente TrueType preferida para las etiquetas; si falla, fuentes del sistema y la integrada.
    #[arg(long, env = "BONES_FONT_PATH")]
    pub font_path: Option<PathBuf>,

    #[arg(long, env = "BONES_FONT_SIZE", default_value_t = 30.0)]
    pub font_size: f32,

    #[arg(long, env = "BONES_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    #[arg(long, env = "BONES_MAX_UPLOAD_MB", default_value_t = 20)]
    pub max_upload_mb: usize,

    /// Registra el execution provider CUDA (requiere la feature `cuda`).
    #[arg(long, env = "BONES_USE_CUDA", default_value_t = false)]
    pub use_cuda: bool,
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}
