//! # Order Error Types
//!
//! Typed error handling for the order workflow.
//! All order operations return `Result<T, OrderError>`.

use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears on the wire
    pub field: String,
    /// Failed rule (e.g. "required", "oneof")
    pub tag: String,
    /// Human readable message
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        tag: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            tag: tag.into(),
            message: message.into(),
        }
    }
}

/// Core error type for all order operations
#[derive(Debug, Error)]
pub enum OrderError {
    /// Missing, malformed or expired credential
    #[error("{0}")]
    Unauthorized(String),

    /// Ownership mismatch, insufficient role or invalid status precondition
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity is absent
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Malformed request body or path identifier
    #[error("{0}")]
    InvalidRequest(String),

    /// Recomputed total does not match the checkout summary
    #[error("Total price mismatch: computed {computed}, checkout summary {expected}")]
    PriceMismatch { computed: i64, expected: i64 },

    /// Structural validation failed
    #[error("Validation failed")]
    Validation { errors: Vec<FieldError> },

    /// Payment provider rejected or failed the request
    #[error("Provider error [{provider}]: {message}")]
    Upstream { provider: String, message: String },

    /// Network/HTTP error communicating with the provider
    #[error("Network error: {0}")]
    Network(String),

    /// Store read or write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A store call exceeded its deadline
    #[error("{operation} timed out after {millis}ms")]
    Timeout { operation: &'static str, millis: u64 },

    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Payment notification failed the authenticity check
    #[error("Notification verification failed: {0}")]
    NotificationVerificationFailed(String),
}

impl OrderError {
    pub fn not_found(entity: &'static str) -> Self {
        OrderError::NotFound { entity }
    }

    /// Returns true for failures rooted in the caller's input rather than in
    /// the system
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OrderError::Validation { .. }
                | OrderError::PriceMismatch { .. }
                | OrderError::InvalidRequest(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::Unauthorized(_) => 401,
            OrderError::Forbidden(_) => 403,
            OrderError::NotFound { .. } => 404,
            OrderError::InvalidRequest(_) => 400,
            OrderError::PriceMismatch { .. } => 400,
            OrderError::Validation { .. } => 422,
            OrderError::Upstream { .. } => 500,
            OrderError::Network(_) => 500,
            OrderError::Persistence(_) => 500,
            OrderError::Timeout { .. } => 500,
            OrderError::Configuration(_) => 500,
            OrderError::Serialization(_) => 500,
            OrderError::NotificationVerificationFailed(_) => 401,
        }
    }

    /// Short status label used in response envelopes
    pub fn status_label(&self) -> &'static str {
        match self.status_code() {
            400 => "bad request",
            401 => "unauthorized",
            403 => "forbidden",
            404 => "not found",
            422 => "unprocessable entity",
            _ => "server error",
        }
    }

    /// Message safe to return to clients
    pub fn public_message(&self) -> String {
        match self {
            OrderError::NotFound { entity } => format!("{} not found", entity),
            OrderError::PriceMismatch { .. } => "Total price mismatch".to_string(),
            OrderError::Upstream { .. } | OrderError::Network(_) => {
                "Failed to create transaction with payment provider".to_string()
            }
            OrderError::Persistence(_) | OrderError::Timeout { .. } => {
                "Storage operation failed".to_string()
            }
            OrderError::Configuration(_) | OrderError::Serialization(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Itemized field errors, if any
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            OrderError::Validation { errors } => Some(errors),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for OrderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut items: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} failed on the '{}' rule", field, e.code));
                    FieldError::new(field.clone(), e.code.to_string(), message)
                })
            })
            .collect();
        items.sort_by(|a, b| a.field.cmp(&b.field));
        OrderError::Validation { errors: items }
    }
}

/// Result type alias for order operations
pub type OrderResult<T> = Result<T, OrderError>;
