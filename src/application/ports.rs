use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{
    detection::{Detection, DetectionSet},
    errors::DomainResult,
    model::{ModelId, ProviderInfo},
};

/// Detector de objetos detrás del pipeline de fracturas.
///
/// Recibe la imagen decodificada tal cual se subió (sin redimensionar) y devuelve
/// las detecciones en el orden de salida del modelo. Puede serializar la inferencia.
#[async_trait]
pub trait DetectionProviderPort: Send + Sync {
    async fn detect(&self, image: &RgbImage) -> DomainResult<DetectionSet>;
    fn info(&self) -> ProviderInfo;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}

/// Dibuja detecciones sobre una copia de la radiografía. Nunca modifica `image`.
///
/// Es CPU puro y síncrono: el servicio lo ejecuta en el pool bloqueante.
pub trait AnnotatorPort: Send + Sync {
    fn annotate(&self, image: &RgbImage, detections: &DetectionSet) -> RgbImage;

    /// Vista de una sola caja: solo la detección elegida, o la copia sin tocar.
    fn annotate_best(&self, image: &RgbImage, best: Option<&Detection>) -> RgbImage {
        match best {
            Some(det) => self.annotate(image, &DetectionSet::single(det)),
            None => image.clone(),
        }
    }
}
