use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info};

use crate::{
    application::ports::{AnnotatorPort, DetectionProviderPort},
    domain::{
        classes::class_name,
        detection::DetectionSet,
        errors::{DomainError, DomainResult},
        model::{ConfidenceThreshold, ProviderInfo},
        report::{Finding, FindingReport},
    },
};

/// Resultado del análisis multi-caja de una radiografía.
#[derive(Debug, Clone)]
pub struct FractureAnalysis {
    /// Detecciones por encima del umbral.
    pub detections: usize,
    pub report: FindingReport,
    pub annotated: RgbImage,
}

/// Resultado de la vista de una sola caja (la de mayor confianza).
#[derive(Debug, Clone)]
pub struct BestDetectionAnalysis {
    pub detected_class: Option<String>,
    pub finding: Option<Finding>,
    pub annotated: RgbImage,
}

/// Caso de uso de detección de fracturas: decodificar, detectar, filtrar, informe y anotación.
///
/// Decodificación y dibujo son CPU puro y van al pool bloqueante de tokio,
/// igual que la inferencia dentro del proveedor.
#[derive(Clone)]
pub struct FractureAnalysisService {
    provider: Arc<dyn DetectionProviderPort>,
    annotator: Arc<dyn AnnotatorPort>,
}

impl FractureAnalysisService {
    pub fn new(provider: Arc<dyn DetectionProviderPort>, annotator: Arc<dyn AnnotatorPort>) -> Self {
        Self { provider, annotator }
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.provider.info()
    }

    pub async fn analyze(
        &self,
        image_bytes: Vec<u8>,
        threshold: ConfidenceThreshold,
    ) -> DomainResult<FractureAnalysis> {
        let image = run_blocking(move || decode_rgb(&image_bytes)).await?;
        let filtered = self.detect_filtered(&image, threshold).await?;

        let report = FindingReport::from_detections(&filtered);
        let detections = filtered.len();
        let annotator = self.annotator.clone();
        let annotated = run_blocking(move || Ok(annotator.annotate(&image, &filtered))).await?;

        Ok(FractureAnalysis {
            detections,
            report,
            annotated,
        })
    }

    pub async fn analyze_best(
        &self,
        image_bytes: Vec<u8>,
        threshold: ConfidenceThreshold,
    ) -> DomainResult<BestDetectionAnalysis> {
        let image = run_blocking(move || decode_rgb(&image_bytes)).await?;
        let filtered = self.detect_filtered(&image, threshold).await?;

        let best = filtered.best().cloned();
        let detected_class = best.as_ref().map(|d| class_name(d.class_id).into_owned());
        let finding = best.as_ref().map(Finding::from);

        let annotator = self.annotator.clone();
        let annotated =
            run_blocking(move || Ok(annotator.annotate_best(&image, best.as_ref()))).await?;

        Ok(BestDetectionAnalysis {
            detected_class,
            finding,
            annotated,
        })
    }

    async fn detect_filtered(
        &self,
        image: &RgbImage,
        threshold: ConfidenceThreshold,
    ) -> DomainResult<DetectionSet> {
        let t_start = Instant::now();
        let raw = self.provider.detect(image).await?;
        let infer_ms = t_start.elapsed().as_secs_f32() * 1000.0;

        let filtered = raw.filter_by_confidence(threshold.value());
        info!(
            "Inferencia {}x{}: {} brutas, {} sobre {:.2} ({:.1} ms)",
            image.width(),
            image.height(),
            raw.len(),
            filtered.len(),
            threshold.value(),
            infer_ms
        );
        Ok(filtered)
    }
}

/// Ejecuta trabajo de CPU (imagen, JPEG) fuera de los workers async.
pub async fn run_blocking<T, F>(job: F) -> DomainResult<T>
where
    F: FnOnce() -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| DomainError::OperationFailed(format!("tarea de imagen abortada: {e}")))?
}

fn decode_rgb(bytes: &[u8]) -> DomainResult<RgbImage> {
    if bytes.is_empty() {
        return Err(DomainError::InvalidInput("imagen vacía".into()));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| DomainError::InvalidInput(format!("no se pudo decodificar la imagen: {e}")))?;
    debug!("Imagen decodificada: {}x{} {:?}", img.width(), img.height(), img.color());
    Ok(img.to_rgb8())
}
