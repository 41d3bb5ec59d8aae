use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
    /// El proveedor de detecciones devolvió datos fuera de contrato
    /// (cajas mal formadas, confianzas fuera de [0, 1], ...).
    #[error("Contrato del detector incumplido: {0}")]
    ContractViolation(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
