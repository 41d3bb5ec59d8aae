use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use image::RgbImage;
use ndarray::Array3;
use ort::session::builder::SessionBuilder;
use ort::session::Session;
use ort::value::Value;
use std::fs;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::application::ports::DetectionProviderPort;
use crate::domain::{
    detection::{Detection, DetectionSet},
    errors::{DomainError, DomainResult},
    model::{ModelId, ProviderInfo},
};

/// Faster R-CNN (ResNet-50 FPN) exportado de torchvision a ONNX.
///
/// Entrada: `[3, H, W]` float en [0, 1], imagen a su tamaño original.
/// Salidas, en orden: `boxes [N, 4]`, `labels [N]` (i64), `scores [N]`.
pub struct OnnxFractureDetector {
    // ort necesita `&mut Session`: las peticiones concurrentes se turnan aquí
    session: Arc<Mutex<Session>>,
    info: ProviderInfo,
}

/// Tensores de salida, copiados fuera de la sesión.
#[derive(Debug, Default)]
struct RawOutputs {
    boxes: Vec<f32>,
    labels: Vec<i64>,
    scores: Vec<f32>,
}

impl OnnxFractureDetector {
    pub fn load(model: &ModelId, intra_threads: usize, use_cuda: bool) -> Result<Self> {
        let builder = Session::builder()?.with_intra_threads(intra_threads)?;
        let (builder, device) = register_cuda(builder, use_cuda);

        let model_bytes = fs::read(&model.onnx_path)
            .with_context(|| format!("leyendo modelo {}", model.onnx_path))?;
        let session = builder
            .commit_from_memory(&model_bytes)
            .with_context(|| format!("cargando grafo ONNX {}", model.onnx_path))?;

        info!("Detector de fracturas '{}' cargado en {}", model.name, device);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            info: ProviderInfo {
                model_type: "Faster R-CNN".to_string(),
                device: device.to_string(),
                model_path: model.onnx_path.clone(),
            },
        })
    }
}

#[cfg(feature = "cuda")]
fn register_cuda(builder: SessionBuilder, use_cuda: bool) -> (SessionBuilder, &'static str) {
    use ort::execution_providers::CUDAExecutionProvider;

    if !use_cuda {
        return (builder, "cpu");
    }
    // CUDA opcional: si no se puede registrar, CPU.
    let cuda = CUDAExecutionProvider::default().build();
    match builder.clone().with_execution_providers([cuda]) {
        Ok(with_cuda) => (with_cuda, "cuda"),
        Err(e) => {
            warn!("CUDA no disponible ({}), usando CPU", e);
            (builder, "cpu")
        }
    }
}

#[cfg(not(feature = "cuda"))]
fn register_cuda(builder: SessionBuilder, use_cuda: bool) -> (SessionBuilder, &'static str) {
    if use_cuda {
        warn!("Compilado sin la feature `cuda`, usando CPU");
    }
    (builder, "cpu")
}

#[async_trait]
impl DetectionProviderPort for OnnxFractureDetector {
    async fn detect(&self, image: &RgbImage) -> DomainResult<DetectionSet> {
        let input = to_chw_tensor(image);
        let session = self.session.clone();

        let raw = tokio::task::spawn_blocking(move || {
            let mut session = session
                .lock()
                .map_err(|_| anyhow!("lock de la sesión envenenado"))?;
            run_session(&mut session, input)
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("tarea de inferencia abortada: {e}")))?
        .map_err(|e| DomainError::OperationFailed(format!("{e:#}")))?;

        DetectionSet::from_provider(parse_outputs(&raw)?)
    }

    fn info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

/// HWC u8 -> CHW f32 en [0, 1] (`ToTensor` de torchvision).
fn to_chw_tensor(rgb: &RgbImage) -> Array3<f32> {
    let (w, h) = rgb.dimensions();
    let mut input = Array3::<f32>::zeros((3, h as usize, w as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        input[[0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
        input[[1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
        input[[2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
    }
    input
}

fn run_session(session: &mut Session, input: Array3<f32>) -> Result<RawOutputs> {
    let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
    let (data, _) = input.into_raw_vec_and_offset();
    let input_tensor = Value::from_array((shape, data))?;

    let outputs = session
        .run(ort::inputs![input_tensor])
        .context("falló la inferencia de Faster R-CNN")?;

    let (_, boxes) = outputs[0].try_extract_tensor::<f32>().context("salida boxes")?;
    let (_, labels) = outputs[1].try_extract_tensor::<i64>().context("salida labels")?;
    let (_, scores) = outputs[2].try_extract_tensor::<f32>().context("salida scores")?;

    Ok(RawOutputs {
        boxes: boxes.to_vec(),
        labels: labels.to_vec(),
        scores: scores.to_vec(),
    })
}

/// Une los tres tensores de salida en detecciones, manteniendo el orden del modelo.
fn parse_outputs(raw: &RawOutputs) -> DomainResult<Vec<Detection>> {
    let n = raw.scores.len();
    if raw.labels.len() != n || raw.boxes.len() != n * 4 {
        return Err(DomainError::ContractViolation(format!(
            "salidas inconsistentes: {} valores de boxes, {} labels, {} scores",
            raw.boxes.len(),
            raw.labels.len(),
            n
        )));
    }

    raw.boxes
        .chunks_exact(4)
        .zip(raw.labels.iter().zip(&raw.scores))
        .map(|(b, (&label, &score))| {
            let class_id = usize::try_from(label).map_err(|_| {
                DomainError::ContractViolation(format!("class id negativo {}", label))
            })?;
            Ok(Detection::new([b[0], b[1], b[2], b[3]], class_id, score))
        })
        .collect()
}
