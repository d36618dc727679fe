//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check header names and socket addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::schema::AppConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("include.headers contains invalid header name {0:?}")]
    HeaderName(String),

    #[error("include.max_concurrent_fetches must be between 1 and {}", Semaphore::MAX_PERMITS)]
    ConcurrencyLimit,

    #[error("include.max_body_bytes must be greater than zero")]
    BodyLimit,

    #[error("invalid catalog.public_base_url {0:?}")]
    PublicBaseUrl(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    for name in &config.include.headers {
        if HeaderName::from_bytes(name.trim().as_bytes()).is_err() {
            errors.push(ValidationError::HeaderName(name.clone()));
        }
    }

    if let Some(limit) = config.include.max_concurrent_fetches {
        if limit == 0 || limit > Semaphore::MAX_PERMITS {
            errors.push(ValidationError::ConcurrencyLimit);
        }
    }

    if config.include.max_body_bytes == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    if url::Url::parse(&config.catalog.public_base_url).is_err() {
        errors.push(ValidationError::PublicBaseUrl(config.catalog.public_base_url.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
