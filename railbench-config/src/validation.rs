//! Per-domain validation rules

use crate::error::{ConfigError, ConfigResult};
use std::fmt::Display;
use std::time::Duration;

/// Implemented by every configuration domain
pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    /// Name used in error messages (`benchmark`, `worker`, ...)
    fn domain_name(&self) -> &'static str;

    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        invalid(self.domain_name(), message)
    }
}

fn invalid(domain: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        domain,
        message: message.into(),
    }
}

pub fn validate_required_string(value: &str, field: &str, domain: &'static str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(domain, format!("{} must be set", field)));
    }
    Ok(())
}

/// Counts, limits and ports must be above zero
pub fn validate_positive<T>(value: T, field: &str, domain: &'static str) -> ConfigResult<()>
where
    T: PartialOrd + Default + Display,
{
    if value > T::default() {
        Ok(())
    } else {
        Err(invalid(domain, format!("{} must be positive (got {})", field, value)))
    }
}

/// Deadlines and intervals; sub-second values are allowed
pub fn validate_duration(value: Duration, field: &str, domain: &'static str) -> ConfigResult<()> {
    if value.is_zero() {
        return Err(invalid(domain, format!("{} must not be zero", field)));
    }
    Ok(())
}

/// Absolute http(s) URL
pub fn validate_url(raw: &str, field: &str, domain: &'static str) -> ConfigResult<()> {
    validate_required_string(raw, field, domain)?;

    let url = url::Url::parse(raw)
        .map_err(|e| invalid(domain, format!("{} is not a URL ({}): {}", field, e, raw)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            domain,
            format!("{} must use http or https, not {}", field, scheme),
        )),
    }
}
