mod domain;
mod application;
mod adapters;
mod config;

use std::sync::Arc;
use clap::Parser;
use crate::application::{ports::ModelCatalogPort, services::FractureAnalysisService};
use crate::adapters::{
    onnx::{fracture_detector::OnnxFractureDetector, model_catalog::OnnxModelCatalog},
    render::{annotator::Annotator, font::LabelFont},
    http::{state::HttpState, router},
};
use crate::config::AppConfig;
use crate::domain::model::ModelId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuración (.env + flags/entorno) y logs (RUST_LOG=info por defecto)
    dotenv::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::parse();
    tracing::info!("🔧 Cargando detector de fracturas desde {}", cfg.model_path);

    // 2. Proveedor de detecciones: se valida, se carga una vez y se comparte
    let model = ModelId {
        name: "fasterrcnn_resnet50_fpn".to_string(),
        onnx_path: cfg.model_path.clone(),
    };
    OnnxModelCatalog::new().validate_model(&model).await?;
    let detector = Arc::new(OnnxFractureDetector::load(&model, cfg.intra_threads, cfg.use_cuda)?);

    // 3. Anotador con la fuente de etiquetas ya resuelta
    let font = LabelFont::resolve(cfg.font_path.as_deref(), cfg.font_size);
    if font.is_builtin() {
        tracing::warn!("Las etiquetas usarán la fuente raster integrada");
    }
    let annotator = Arc::new(Annotator::new(font));

    // 4. Caso de uso + estado HTTP
    let analysis = Arc::new(FractureAnalysisService::new(detector, annotator));
    let state = HttpState { analysis };
    let app = router(state, cfg.max_upload_bytes());

    // 5. Servir
    let addr = cfg.bind_addr();
    tracing::info!("🚀 API de fracturas escuchando en http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
