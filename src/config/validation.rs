use super::models::{Config, FallbackMode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("fetch.batch_size must be at least 1")]
    InvalidBatchSize,

    #[error("fetch.max_attempts must be at least 1")]
    InvalidMaxAttempts,

    #[error("fetch.backoff_base ({base}) exceeds fetch.backoff_cap ({cap})")]
    BackoffExceedsCap { base: String, cap: String },

    #[error("Invalid upstream base_url '{url}', expected an http:// or https:// URL")]
    InvalidBaseUrl { url: String },

    #[error("server.homepage_limit must be at least 1")]
    InvalidHomepageLimit,

    #[error("fetch.fallback_template must contain '{{handle}}' when fallback = \"cdn_template\"")]
    InvalidFallbackTemplate,

    #[error("fields.images must name at least one upstream field")]
    NoImageFields,
}

/// Validate the entire configuration
///
/// Credentials are not checked here; a server without them still starts and
/// reports a configuration error per request.
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_upstream(config)?;
    validate_fetch(config)?;
    validate_fields(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.homepage_limit == 0 {
        return Err(ValidationError::InvalidHomepageLimit);
    }

    Ok(())
}

fn validate_upstream(config: &Config) -> Result<(), ValidationError> {
    let url = &config.upstream.base_url;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::InvalidBaseUrl { url: url.clone() });
    }

    Ok(())
}

fn validate_fetch(config: &Config) -> Result<(), ValidationError> {
    let fetch = &config.fetch;

    if fetch.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize);
    }

    if fetch.max_attempts == 0 {
        return Err(ValidationError::InvalidMaxAttempts);
    }

    if fetch.backoff_base > fetch.backoff_cap {
        return Err(ValidationError::BackoffExceedsCap {
            base: fetch.backoff_base.to_string(),
            cap: fetch.backoff_cap.to_string(),
        });
    }

    if fetch.fallback == FallbackMode::CdnTemplate && !fetch.fallback_template.contains("{handle}") {
        return Err(ValidationError::InvalidFallbackTemplate);
    }

    Ok(())
}

fn validate_fields(config: &Config) -> Result<(), ValidationError> {
    if config.fields.images.iter().all(|field| field.trim().is_empty()) {
        return Err(ValidationError::NoImageFields);
    }

    Ok(())
}
