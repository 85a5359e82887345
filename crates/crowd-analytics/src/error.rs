use thiserror::Error;

/// Errors raised by the analytics engine.
///
/// Degenerate inputs (empty series, zero mean, a single sample) are not errors;
/// each component returns a neutral result for them instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("invalid configuration: {field} is out of range (got {value})")]
    InvalidConfiguration { field: &'static str, value: f64 },
}

impl AnalyticsError {
    pub fn invalid_configuration(field: &'static str, value: f64) -> Self {
        Self::InvalidConfiguration { field, value }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Reject zero, negative and non-finite configuration values
pub(crate) fn ensure_positive(value: f64, field: &'static str) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AnalyticsError::invalid_configuration(field, value))
    }
}

/// Reject negative and non-finite configuration values; zero is allowed
pub(crate) fn ensure_non_negative(value: f64, field: &'static str) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AnalyticsError::invalid_configuration(field, value))
    }
}
