//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: PipelineConfig → Result<(), Vec<ValidationError>>
//! - Serde handles syntax; this module checks meaning

use std::net::SocketAddr;

use crate::config::schema::PipelineConfig;
use crate::pipeline::Severity;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("observability.log_level: {0}")]
    LogLevel(String),

    #[error("observability.metrics_address: '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.observability.log_level.parse::<Severity>() {
        errors.push(ValidationError::LogLevel(e.to_string()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
