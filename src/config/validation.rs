//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check header names and values are sendable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TransportConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::TransportConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("invalid value for header '{0}'")]
    InvalidHeaderValue(String),

    #[error("header '{0}' has no values")]
    EmptyHeaderValues(String),

    #[error("sensitive_headers contains an empty name")]
    EmptySensitiveHeader,
}

pub fn validate_config(config: &TransportConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (name, values) in &config.additional_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
            continue;
        }
        if values.is_empty() {
            errors.push(ValidationError::EmptyHeaderValues(name.clone()));
        }
        if values.iter().any(|v| HeaderValue::from_str(v).is_err()) {
            errors.push(ValidationError::InvalidHeaderValue(name.clone()));
        }
    }

    if let Some(names) = &config.sensitive_headers {
        if names.iter().any(|n| n.trim().is_empty()) {
            errors.push(ValidationError::EmptySensitiveHeader);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
