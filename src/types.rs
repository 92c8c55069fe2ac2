//! Shared error and result types

use hyper::StatusCode;
use thiserror::Error;

/// Errors raised while handling payment callbacks and talking to the store
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Body was not a well-formed callback payload
    #[error("Invalid callback payload: {0}")]
    InvalidPayload(String),

    /// Signature missing or not made by the configured processor key
    #[error("Invalid callback signature: {0}")]
    InvalidSignature(String),

    /// orderId does not follow `emblem_{type}_{userId}_{timestamp}`
    #[error("Invalid orderId format: {0}")]
    InvalidOrderId(String),

    /// Amount is not a non-negative whole number of bani
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),

    /// Stock document for the emblem type has never been created
    #[error("Emblem collection '{0}' does not exist")]
    CollectionMissing(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// True for failures caused by the caller's request rather than the gateway
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidPayload(_)
                | GatewayError::InvalidSignature(_)
                | GatewayError::InvalidOrderId(_)
                | GatewayError::InvalidAmount(_)
        )
    }

    /// HTTP status for the error envelope.
    ///
    /// Payment processors only distinguish success from failure, so by default
    /// every failure is a 500. Strict mode separates caller mistakes (4xx)
    /// from store failures (5xx).
    pub fn status_code(&self, strict: bool) -> StatusCode {
        if !strict {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        match self {
            GatewayError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<mongodb::error::Error> for GatewayError {
    fn from(e: mongodb::error::Error) -> Self {
        GatewayError::Database(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping_is_always_500() {
        let errors = [
            GatewayError::InvalidOrderId("x".into()),
            GatewayError::InvalidSignature("x".into()),
            GatewayError::Database("x".into()),
        ];
        for e in errors {
            assert_eq!(e.status_code(false), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_strict_mapping() {
        assert_eq!(
            GatewayError::InvalidOrderId("x".into()).status_code(true),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::InvalidSignature("x".into()).status_code(true),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::CollectionMissing("corbul_mistic".into()).status_code(true),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
