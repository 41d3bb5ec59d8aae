use axum::{
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    Json,
};
use base64::{prelude::BASE64_STANDARD, Engine};
use image::{codecs::jpeg::JpegEncoder, RgbImage};

use crate::adapters::http::{errors::ApiError, state::HttpState};
use crate::application::dto::{
    BestDetectionResponse, HealthResponse, PredictQuery, PredictResponse, StatusResponse,
};
use crate::application::services::run_blocking;
use crate::domain::{
    classes::{CLASS_NAMES, NUM_CLASSES},
    errors::{DomainError, DomainResult},
    model::ConfidenceThreshold,
};

const JPEG_QUALITY: u8 = 90;
const UPLOAD_FIELD: &str = "file";

pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Bone fracture detection API is running".into(),
        status: "healthy".into(),
        model_loaded: true,
    })
}

pub async fn health(State(st): State<HttpState>) -> Json<HealthResponse> {
    let info = st.analysis.provider_info();
    Json(HealthResponse {
        status: "healthy".into(),
        model_loaded: true,
        device: info.device,
        model_type: info.model_type,
        model_path: info.model_path,
        num_classes: NUM_CLASSES,
        classes: CLASS_NAMES.iter().map(|c| c.to_string()).collect(),
    })
}

pub async fn predict(
    State(st): State<HttpState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let threshold = threshold_from(query?.0)?;
    let bytes = read_upload(multipart?).await?;

    let analysis = st.analysis.analyze(bytes, threshold).await?;
    Ok(Json(PredictResponse {
        success: true,
        detections: analysis.detections,
        image_base64: encode_data_url(analysis.annotated).await?,
        findings: analysis.report.findings,
        caption: analysis.report.caption,
    }))
}

/// Vista de una sola caja: solo se dibuja la detección de mayor confianza.
pub async fn predict_best(
    State(st): State<HttpState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BestDetectionResponse>, ApiError> {
    let threshold = threshold_from(query?.0)?;
    let bytes = read_upload(multipart?).await?;

    let analysis = st.analysis.analyze_best(bytes, threshold).await?;
    Ok(Json(BestDetectionResponse {
        success: true,
        detected_class: analysis.detected_class,
        finding: analysis.finding,
        image_base64: encode_data_url(analysis.annotated).await?,
    }))
}

fn threshold_from(query: PredictQuery) -> Result<ConfidenceThreshold, ApiError> {
    Ok(query
        .threshold
        .map(ConfidenceThreshold::new)
        .transpose()?
        .unwrap_or_default())
}

async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            let data = field.bytes().await?;
            return Ok(data.to_vec());
        }
    }
    Err(ApiError::bad_request(format!("falta el campo multipart '{UPLOAD_FIELD}'")))
}

async fn encode_data_url(img: RgbImage) -> Result<String, ApiError> {
    Ok(run_blocking(move || jpeg_data_url(&img)).await?)
}

fn jpeg_data_url(img: &RgbImage) -> DomainResult<String> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    encoder
        .encode_image(img)
        .map_err(|e| DomainError::OperationFailed(format!("fallo al codificar JPEG: {e}")))?;
    Ok(format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(&buf)))
}
