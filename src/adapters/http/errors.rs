use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{error, warn};

use crate::application::dto::ErrorResponse;
use crate::domain::errors::DomainError;

/// Cara HTTP de los errores, siempre como `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    /// Petición rechazada antes del caso de uso (query, multipart, límite de tamaño).
    Request { status: StatusCode, detail: String },
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        Self::Request { status: r.status(), detail: r.body_text() }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(r: MultipartRejection) -> Self {
        Self::Request { status: r.status(), detail: r.body_text() }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::Request {
            status: e.status(),
            detail: format!("cuerpo multipart inválido: {}", e.body_text()),
        }
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::Domain(DomainError::InvalidInput(msg.into()))
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Domain(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Domain(DomainError::ContractViolation(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Domain(DomainError::OperationFailed(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Request { status, .. } => *status,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Domain(e) => e.to_string(),
            ApiError::Request { detail, .. } => detail.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() {
            error!("Fallo en la predicción ({}): {}", status, detail);
        } else {
            warn!("Petición rechazada ({}): {}", status, detail);
        }
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
