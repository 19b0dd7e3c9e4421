//! Service-level error taxonomy and its HTTP mapping.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::documents::DocumentError;
use crate::gateway::GatewayError;
use crate::ledger::LedgerError;
use crate::ErrorResponse;

/// Errors surfaced at the API boundary. None of them are retried internally.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Name used in the `error` field of the response payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::Validation(_) => "ValidationFailure",
            Self::Upstream(_) => "UpstreamFailure",
            Self::Io(_) => "IOFailure",
            Self::Internal(_) => "InternalServerError",
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("{}: {}", self.kind(), self);
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.kind(), &self.to_string()))
    }
}

impl From<DocumentError> for ServiceError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::MissingRelation(message) => Self::NotFound(message),
            other => Self::Io(other.to_string()),
        }
    }
}

impl From<LedgerError> for ServiceError {
    fn from(err: LedgerError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<GatewayError> for ServiceError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::InvalidSessionId(_) => Self::Validation(message),
            _ => Self::Upstream(message),
        }
    }
}

/// Parse a numeric identifier taken from a path segment.
pub fn parse_id(raw: &str, label: &str) -> Result<i32, ServiceError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ServiceError::validation(format!("{} '{}' is not a valid identifier", label, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_positive_numbers() {
        assert_eq!(parse_id("42", "pagoId").unwrap(), 42);
        assert_eq!(parse_id(" 7 ", "pagoId").unwrap(), 7);
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        assert!(matches!(parse_id("abc", "pagoId"), Err(ServiceError::Validation(_))));
        assert!(matches!(parse_id("0", "pagoId"), Err(ServiceError::Validation(_))));
        assert!(matches!(parse_id("-3", "pagoId"), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Upstream("x".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ServiceError::Io("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_relation_maps_to_not_found() {
        let err: ServiceError = DocumentError::MissingRelation("Nomina 3 no encontrada".into()).into();
        assert_eq!(err.kind(), "NotFound");
    }
}
