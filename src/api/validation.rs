use thiserror::Error;

const MAX_SLUG_LEN: usize = 200;
const MAX_FILTER_LEN: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("slug must not be empty")]
    EmptySlug,
    #[error("slug exceeds {MAX_SLUG_LEN} characters")]
    SlugTooLong,
    #[error("slug '{0}' may only contain letters, digits, '-', '_' and '.'")]
    InvalidSlug(String),
    #[error("{0} exceeds {MAX_FILTER_LEN} characters")]
    FilterTooLong(&'static str),
}

/// Slugs are matched verbatim upstream, so only URL-safe ones are accepted
pub fn validate_slug(slug: &str) -> Result<(), RequestValidationError> {
    if slug.is_empty() {
        return Err(RequestValidationError::EmptySlug);
    }

    if slug.chars().count() > MAX_SLUG_LEN {
        return Err(RequestValidationError::SlugTooLong);
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(RequestValidationError::InvalidSlug(slug.to_string()));
    }

    Ok(())
}

/// Length check for a listing filter query parameter named `param`
pub fn validate_filter(param: &'static str, value: &str) -> Result<(), RequestValidationError> {
    if value.chars().count() > MAX_FILTER_LEN {
        return Err(RequestValidationError::FilterTooLong(param));
    }
    Ok(())
}
