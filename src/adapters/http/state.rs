use std::sync::Arc;
use crate::application::services::FractureAnalysisService;

/// Estado compartido de los handlers de Axum: solo servicios de caso de uso, sin adaptadores.
#[derive(Clone)]
pub struct HttpState {
    /// Detección, informe y anotación de fracturas.
    pub analysis: Arc<FractureAnalysisService>,
}
